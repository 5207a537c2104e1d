use std::cell::Cell;
use std::time::Duration;

use tracing::{error, info, instrument};

use satb_domain::{ArtifactMap, Severity, UploadFile, ValidationError};

use crate::{TabOrchestrator, Trigger, UploadError};

pub const PROCESSING_STATUS: &str = "Processing your audio file...";
pub const COMPLETE_STATUS: &str = "Processing complete!";

/// Drives one upload at a time from file choice to the default tab.
pub struct UploadSession {
    default_part: String,
    reveal_delay: Duration,
    in_flight: Cell<bool>,
}

impl UploadSession {
    pub fn new(default_part: impl Into<String>, reveal_delay: Duration) -> Self {
        Self {
            default_part: default_part.into(),
            reveal_delay,
            in_flight: Cell::new(false),
        }
    }

    pub fn is_uploading(&self) -> bool {
        self.in_flight.get()
    }

    /// Checks a file as soon as it is picked and updates the picker label.
    pub fn select(&self, name: Option<&str>, tabs: &TabOrchestrator) -> Result<(), ValidationError> {
        let Some(name) = name else {
            tabs.view.set_selected_file(None);
            return Ok(());
        };
        if let Err(err) = UploadFile::check_name(name) {
            tabs.notifier.notify(&err.to_string(), Severity::Error);
            tabs.view.set_selected_file(None);
            return Err(err);
        }
        tabs.view.set_selected_file(Some(name));
        Ok(())
    }

    /// Sends `file` for transcription. On success the returned map has
    /// replaced the session's artifacts and the default part is active.
    #[instrument(skip_all)]
    pub async fn submit(
        &self,
        file: Option<UploadFile>,
        tabs: &TabOrchestrator,
    ) -> Result<ArtifactMap, UploadError> {
        if self.in_flight.get() {
            return Err(UploadError::InFlight);
        }
        let file = match validate(file) {
            Ok(file) => file,
            Err(err) => {
                tabs.notifier.notify(&err.to_string(), Severity::Error);
                return Err(err.into());
            }
        };

        self.in_flight.set(true);
        tabs.view.set_trigger_enabled(Trigger::Upload, false);
        tabs.view.set_progress(Some(PROCESSING_STATUS));

        let result = self.run(&file, tabs).await;

        self.in_flight.set(false);
        tabs.view.set_trigger_enabled(Trigger::Upload, true);
        result
    }

    async fn run(&self, file: &UploadFile, tabs: &TabOrchestrator) -> Result<ArtifactMap, UploadError> {
        let response = match tabs.backend.upload(file).await {
            Ok(response) => response,
            Err(err) => {
                let message = err.to_string();
                error!(%message, "upload error");
                let status = format!("Error: {message}");
                tabs.view.set_progress(Some(&status));
                tabs.notifier.notify(&status, Severity::Error);
                return Err(UploadError::RequestFailed(message));
            }
        };

        info!(artifacts = response.files.len(), "upload complete");
        tabs.replace_artifacts(response.files.clone());
        tabs.view.set_progress(Some(COMPLETE_STATUS));
        if !self.reveal_delay.is_zero() {
            tokio::time::sleep(self.reveal_delay).await;
        }
        tabs.view.set_progress(None);
        tabs.view.reveal_results();
        tabs.switch_tab(&self.default_part).await;
        Ok(response.files)
    }
}

fn validate(file: Option<UploadFile>) -> Result<UploadFile, ValidationError> {
    let file = file.ok_or(ValidationError::MissingFile)?;
    UploadFile::check_name(&file.name)?;
    Ok(file)
}

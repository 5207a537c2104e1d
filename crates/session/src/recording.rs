use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant};
use tracing::{debug, error, info, instrument};

use satb_domain::{RecordingDuration, RecordingOutcome, Severity};
use satb_services::TranscriptionBackend;

use crate::{NotificationSink, RecordingError, Trigger, View};

/// Drives a timed recording request and shows its results.
pub struct RecordingSession {
    backend: Arc<dyn TranscriptionBackend>,
    view: Rc<dyn View>,
    notifier: Rc<dyn NotificationSink>,
    tick: Duration,
    recording: Cell<bool>,
    last: RefCell<Option<RecordingOutcome>>,
}

impl RecordingSession {
    pub fn new(
        backend: Arc<dyn TranscriptionBackend>,
        view: Rc<dyn View>,
        notifier: Rc<dyn NotificationSink>,
        tick: Duration,
    ) -> Self {
        Self {
            backend,
            view,
            notifier,
            tick,
            recording: Cell::new(false),
            last: RefCell::new(None),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording.get()
    }

    /// Results of the most recent successful recording.
    pub fn last_outcome(&self) -> Option<RecordingOutcome> {
        self.last.borrow().clone()
    }

    /// Starts a recording of `duration` seconds, as typed by the user.
    /// Returns `Ok(None)` without doing anything when one is already running.
    #[instrument(skip(self))]
    pub async fn start(&self, duration: &str) -> Result<Option<RecordingOutcome>, RecordingError> {
        if self.recording.get() {
            debug!("recording already in progress");
            return Ok(None);
        }
        let duration = match RecordingDuration::parse(duration) {
            Ok(duration) => duration,
            Err(err) => {
                self.notifier.notify(&err.to_string(), Severity::Error);
                return Err(err.into());
            }
        };

        self.recording.set(true);
        self.view.set_trigger_enabled(Trigger::Record, false);
        let result = self.run(duration).await;
        self.recording.set(false);
        self.view.set_trigger_enabled(Trigger::Record, true);
        result.map(Some)
    }

    async fn run(&self, duration: RecordingDuration) -> Result<RecordingOutcome, RecordingError> {
        info!(seconds = duration.seconds(), "recording started");
        self.view.set_progress(Some(&format!(
            "Recording for {} seconds...",
            duration.seconds()
        )));

        // The countdown only tracks local time; the request decides when
        // recording is over.
        let mut remaining = duration.seconds();
        self.view.set_countdown(Some(remaining));
        let mut ticker = interval_at(Instant::now() + self.tick, self.tick);
        let request = self.backend.record(duration);
        tokio::pin!(request);
        let response = loop {
            tokio::select! {
                response = &mut request => break response,
                _ = ticker.tick(), if remaining > 0 => {
                    remaining -= 1;
                    self.view.set_countdown(Some(remaining));
                }
            }
        };
        drop(ticker);
        self.view.set_countdown(None);

        match response {
            Ok(response) => {
                let outcome = response.outcome;
                self.view.set_progress(None);
                self.view
                    .show_recording(outcome.transcription(), &outcome.rows());
                *self.last.borrow_mut() = Some(outcome.clone());
                self.notifier
                    .notify("Recording processed", Severity::Success);
                Ok(outcome)
            }
            Err(err) => {
                let message = err.to_string();
                error!(%message, "recording error");
                let status = format!("Error: {message}");
                self.view.set_progress(Some(&status));
                self.notifier.notify(&status, Severity::Error);
                Err(RecordingError::RequestFailed(message))
            }
        }
    }
}

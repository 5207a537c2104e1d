use std::rc::Rc;
use std::sync::Arc;

use tracing::info;

use satb_audio::{AudioOutput, ElementId, PlaybackError};
use satb_domain::{ArtifactMap, RecordingOutcome, SessionState, UploadFile, ValidationError};
use satb_notation::NotationRenderer;
use satb_services::TranscriptionBackend;

use crate::{
    Download, DownloadError, NotationOutcome, NotificationSink, PlaybackController,
    RecordingError, RecordingSession, StudioConfig, TabOrchestrator, UploadError,
    UploadSession, View,
};

/// One client session: wires the upload, recording, tab and playback
/// components to a shared backend, view and notifier.
pub struct Studio {
    tabs: TabOrchestrator,
    upload: UploadSession,
    recording: RecordingSession,
}

impl Studio {
    pub fn new(
        config: &StudioConfig,
        backend: Arc<dyn TranscriptionBackend>,
        renderer: Option<Arc<dyn NotationRenderer>>,
        output: Arc<dyn AudioOutput>,
        view: Rc<dyn View>,
        notifier: Rc<dyn NotificationSink>,
    ) -> Self {
        info!(
            default_part = %config.default_part,
            viewer = renderer.is_some(),
            "starting studio session"
        );
        let playback = PlaybackController::new(output, view.clone(), notifier.clone());
        let recording = RecordingSession::new(
            backend.clone(),
            view.clone(),
            notifier.clone(),
            config.countdown_tick(),
        );
        let tabs = TabOrchestrator::new(
            &config.default_part,
            backend,
            renderer,
            playback,
            view,
            notifier,
        );
        Self {
            tabs,
            upload: UploadSession::new(config.default_part.clone(), config.reveal_delay()),
            recording,
        }
    }

    pub fn tabs(&self) -> &TabOrchestrator {
        &self.tabs
    }

    pub fn recording(&self) -> &RecordingSession {
        &self.recording
    }

    pub fn select_file(&self, name: Option<&str>) -> Result<(), ValidationError> {
        self.upload.select(name, &self.tabs)
    }

    pub async fn upload(&self, file: Option<UploadFile>) -> Result<ArtifactMap, UploadError> {
        self.upload.submit(file, &self.tabs).await
    }

    pub async fn record(&self, duration: &str) -> Result<Option<RecordingOutcome>, RecordingError> {
        self.recording.start(duration).await
    }

    pub async fn switch_tab(&self, part: &str) -> NotationOutcome {
        self.tabs.switch_tab(part).await
    }

    pub async fn toggle_playback(&self) -> Result<bool, PlaybackError> {
        self.tabs.playback().toggle().await
    }

    pub fn stop_playback(&self) {
        self.tabs.playback().stop();
    }

    pub fn track_ended(&self, id: ElementId) {
        self.tabs.playback().track_ended(id);
    }

    pub fn download_current_part(&self) -> Result<Download, DownloadError> {
        self.tabs.download_current_part()
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            current_part: self.tabs.current_part(),
            artifacts: self.tabs.artifacts(),
            is_uploading: self.upload.is_uploading(),
            is_recording: self.recording.is_recording(),
            is_playing: self.tabs.playback().is_playing(),
        }
    }
}

pub mod config;
pub mod download;
pub mod error;
pub mod notify;
pub mod playback;
pub mod recording;
pub mod studio;
pub mod tabs;
pub mod upload;
pub mod view;

#[cfg(test)]
mod testing;

pub use config::StudioConfig;
pub use download::{resolve_download, Download, DownloadKind};
pub use error::{DownloadError, RecordingError, UploadError};
pub use notify::{NotificationSink, TracingSink};
pub use playback::{PlaybackController, PlaybackSetup, MIDI_FALLBACK_WARNING};
pub use recording::RecordingSession;
pub use studio::Studio;
pub use tabs::{NotationOutcome, TabOrchestrator};
pub use upload::{UploadSession, COMPLETE_STATUS, PROCESSING_STATUS};
pub use view::{NotationView, Trigger, View};

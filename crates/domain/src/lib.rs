pub mod artifacts;
pub mod error;
pub mod media;
pub mod notify;
pub mod state;
pub mod tracks;

pub use crate::artifacts::{audio_key, file_name, midi_key, ArtifactMap, NotationFormat};
pub use crate::error::ValidationError;
pub use crate::media::{RecordingDuration, UploadFile};
pub use crate::notify::Severity;
pub use crate::state::{SessionState, DEFAULT_PART};
pub use crate::tracks::{track_rows, Artist, ExternalUrls, RecordingOutcome, TrackDescriptor, TrackRow};

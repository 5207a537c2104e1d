use thiserror::Error;

use satb_domain::ValidationError;
use satb_services::TransportError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("an upload is already in progress")]
    InFlight,
    #[error("{0}")]
    RequestFailed(String),
}

impl From<TransportError> for UploadError {
    fn from(err: TransportError) -> Self {
        UploadError::RequestFailed(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordingError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("{0}")]
    RequestFailed(String),
}

impl From<TransportError> for RecordingError {
    fn from(err: TransportError) -> Self {
        RecordingError::RequestFailed(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error("No file available for this part.")]
    NothingAvailable { part: String },
}

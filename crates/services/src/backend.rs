use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use satb_domain::{ArtifactMap, RecordingDuration, RecordingOutcome, UploadFile};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error(
        "HTTP error {status}{}",
        .detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
    )]
    Status { status: u16, detail: Option<String> },
    #[error("{0}")]
    Request(String),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("invalid backend URL: {0}")]
    Url(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// Body of a successful `POST /upload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub files: ArtifactMap,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub basename: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordRequest {
    pub duration: RecordingDuration,
}

/// Body of a successful `POST /record`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordResponse {
    #[serde(flatten)]
    pub outcome: RecordingOutcome,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body the backend sends with non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

/// The transcription service as seen from the client.
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    async fn upload(&self, file: &UploadFile) -> Result<UploadResponse, TransportError>;

    async fn record(&self, duration: RecordingDuration) -> Result<RecordResponse, TransportError>;

    /// Raw notation source served under `/results/{file_name}`.
    async fn fetch_notation(&self, file_name: &str) -> Result<String, TransportError>;

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, TransportError>;

    fn results_url(&self, file_name: &str) -> String;

    fn audio_url(&self, reference: &str) -> String;
}

use thiserror::Error;

/// Input rejected before any request leaves the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select an MP3 file")]
    MissingFile,
    #[error("Only MP3 files are supported")]
    InvalidFormat { file_name: String },
    #[error("Recording duration must be a whole number between {min} and {max} seconds")]
    InvalidDuration { input: String, min: u32, max: u32 },
}

impl ValidationError {
    pub fn invalid_format<T: Into<String>>(file_name: T) -> Self {
        Self::InvalidFormat {
            file_name: file_name.into(),
        }
    }
}

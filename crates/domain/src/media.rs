use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// An audio file picked for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub const EXTENSION: &'static str = ".mp3";

    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ValidationError> {
        let name = name.into();
        Self::check_name(&name)?;
        Ok(Self { name, bytes })
    }

    /// Accepts names ending in `.mp3`, ignoring case.
    pub fn check_name(name: &str) -> Result<(), ValidationError> {
        if name.to_ascii_lowercase().ends_with(Self::EXTENSION) {
            Ok(())
        } else {
            Err(ValidationError::invalid_format(name))
        }
    }
}

/// Length of a live recording, in whole seconds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct RecordingDuration(u32);

impl RecordingDuration {
    pub const MIN_SECONDS: u32 = 1;
    pub const MAX_SECONDS: u32 = 30;

    pub fn new(seconds: u32) -> Result<Self, ValidationError> {
        if !(Self::MIN_SECONDS..=Self::MAX_SECONDS).contains(&seconds) {
            return Err(Self::invalid(seconds.to_string()));
        }
        Ok(Self(seconds))
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let seconds = input
            .trim()
            .parse::<u32>()
            .map_err(|_| Self::invalid(input))?;
        Self::new(seconds).map_err(|_| Self::invalid(input))
    }

    pub fn seconds(self) -> u32 {
        self.0
    }

    fn invalid(input: impl Into<String>) -> ValidationError {
        ValidationError::InvalidDuration {
            input: input.into(),
            min: Self::MIN_SECONDS,
            max: Self::MAX_SECONDS,
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::ArtifactMap;

/// Part selected when a session starts and after every successful upload.
pub const DEFAULT_PART: &str = "score";

/// Point-in-time view of one client session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionState {
    pub current_part: String,
    pub artifacts: ArtifactMap,
    pub is_uploading: bool,
    pub is_recording: bool,
    pub is_playing: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            current_part: DEFAULT_PART.to_string(),
            artifacts: ArtifactMap::new(),
            is_uploading: false,
            is_recording: false,
            is_playing: false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.is_uploading || self.is_recording
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_on_score() {
        let state = SessionState::new();
        assert_eq!(state.current_part, "score");
        assert!(state.artifacts.is_empty());
        assert!(!state.is_busy());
        assert!(!state.is_playing);
    }
}

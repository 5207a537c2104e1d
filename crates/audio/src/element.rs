use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("No audio available for this part")]
    NoAudio,
    /// The host refused to start playback, e.g. an autoplay policy.
    #[error("{0}")]
    Rejected(String),
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "audio#{}", self.0)
    }
}

/// A single playable audio source attached to the host.
#[async_trait]
pub trait AudioElement: Send + Sync {
    fn id(&self) -> ElementId;
    fn source(&self) -> &str;
    /// Resolves once playback has actually started.
    async fn play(&self) -> Result<(), PlaybackError>;
    fn pause(&self);
    /// Moves the play position back to the start.
    fn rewind(&self);
    /// Detaches the element from the host. It must not be used afterwards.
    fn release(&self);
}

pub trait AudioOutput: Send + Sync {
    /// Creates a paused element pointed at `source`.
    fn create(&self, id: ElementId, source: &str) -> Arc<dyn AudioElement>;
}

/// Output for headless hosts: elements only log what they would do.
#[derive(Debug, Default)]
pub struct NullOutput;

impl AudioOutput for NullOutput {
    fn create(&self, id: ElementId, source: &str) -> Arc<dyn AudioElement> {
        debug!(%id, source, "creating null audio element");
        Arc::new(NullElement {
            id,
            source: source.to_string(),
            playing: AtomicBool::new(false),
            released: AtomicBool::new(false),
        })
    }
}

#[derive(Debug)]
pub struct NullElement {
    id: ElementId,
    source: String,
    playing: AtomicBool,
    released: AtomicBool,
}

impl NullElement {
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioElement for NullElement {
    fn id(&self) -> ElementId {
        self.id
    }

    fn source(&self) -> &str {
        &self.source
    }

    async fn play(&self) -> Result<(), PlaybackError> {
        if self.is_released() {
            return Err(PlaybackError::Rejected(format!(
                "{} has been released",
                self.id
            )));
        }
        debug!(id = %self.id, source = %self.source, "null playback started");
        self.playing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }

    fn rewind(&self) {
        debug!(id = %self.id, "rewinding");
    }

    fn release(&self) {
        self.playing.store(false, Ordering::SeqCst);
        self.released.store(true, Ordering::SeqCst);
    }
}

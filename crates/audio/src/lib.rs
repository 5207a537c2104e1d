pub mod element;

pub use element::{AudioElement, AudioOutput, ElementId, NullElement, NullOutput, PlaybackError};

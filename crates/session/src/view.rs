use satb_domain::TrackRow;

use crate::Download;

/// Controls that start a long-running request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    Upload,
    Record,
}

/// What the notation area currently shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotationView {
    /// Nothing uploaded yet.
    Empty,
    Loading { part: String },
    Rendered { part: String, markup: String },
    Unavailable { part: String },
    /// The artifact exists but is not notation; playback is the way to use it.
    Unsupported { part: String, file_name: String },
    ViewerMissing,
    Failed { part: String, message: String },
}

impl NotationView {
    /// Placeholder text, `None` for rendered content.
    pub fn placeholder(&self) -> Option<String> {
        match self {
            NotationView::Empty => Some("Upload an MP3 file to see its parts.".to_string()),
            NotationView::Loading { part } => Some(format!("Loading {part} notation...")),
            NotationView::Rendered { .. } => None,
            NotationView::Unavailable { .. } => Some("No file available for this part.".to_string()),
            NotationView::Unsupported { file_name, .. } => Some(format!(
                "File format not supported for display: {file_name}\nClick Play to listen to this part."
            )),
            NotationView::ViewerMissing => Some("Music notation viewer not available.".to_string()),
            NotationView::Failed { message, .. } => {
                Some(format!("Error loading notation: {message}"))
            }
        }
    }
}

/// The display surface. Every call replaces what the region showed before.
pub trait View {
    fn set_active_tab(&self, part: &str);
    fn set_notation(&self, content: NotationView);
    /// `None` hides the progress area.
    fn set_progress(&self, status: Option<&str>);
    fn reveal_results(&self);
    fn set_trigger_enabled(&self, trigger: Trigger, enabled: bool);
    /// Label of the file picker; `None` resets it.
    fn set_selected_file(&self, name: Option<&str>);
    fn set_playing(&self, playing: bool);
    /// `None` removes the countdown.
    fn set_countdown(&self, remaining: Option<u32>);
    fn show_recording(&self, transcription: &str, rows: &[TrackRow]);
    fn offer_download(&self, download: &Download);
}

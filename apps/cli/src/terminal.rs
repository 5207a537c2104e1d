use std::cell::RefCell;
use std::io::{self, Stdout, Write};

use tracing::debug;

use satb_domain::TrackRow;
use satb_session::{Download, NotationView, Trigger, View};

/// Writes view updates as plain lines.
pub struct TerminalView<W: Write = Stdout> {
    out: RefCell<W>,
}

impl TerminalView<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn line(&self, text: &str) {
        if let Err(err) = writeln!(self.out.borrow_mut(), "{text}") {
            debug!(%err, "terminal write failed");
        }
    }
}

impl<W: Write> View for TerminalView<W> {
    fn set_active_tab(&self, part: &str) {
        self.line(&format!("== {part} =="));
    }

    fn set_notation(&self, content: NotationView) {
        match content {
            NotationView::Rendered { part, markup } => {
                self.line(&format!("{part}: notation rendered ({} bytes of SVG)", markup.len()));
            }
            NotationView::Loading { .. } => {}
            other => {
                if let Some(text) = other.placeholder() {
                    self.line(&text);
                }
            }
        }
    }

    fn set_progress(&self, status: Option<&str>) {
        if let Some(status) = status {
            self.line(status);
        }
    }

    fn reveal_results(&self) {}

    fn set_trigger_enabled(&self, _trigger: Trigger, _enabled: bool) {}

    fn set_selected_file(&self, name: Option<&str>) {
        if let Some(name) = name {
            self.line(&format!("Selected {name}"));
        }
    }

    fn set_playing(&self, _playing: bool) {}

    fn set_countdown(&self, remaining: Option<u32>) {
        if let Some(remaining) = remaining {
            self.line(&format!("{remaining}s"));
        }
    }

    fn show_recording(&self, transcription: &str, rows: &[TrackRow]) {
        self.line("Transcription:");
        self.line(transcription);
        self.line("Matching tracks:");
        for row in rows {
            match row {
                TrackRow::Match {
                    name,
                    artists,
                    link,
                } => match link {
                    Some(link) => self.line(&format!("  {name} - {artists} <{link}>")),
                    None => self.line(&format!("  {name} - {artists}")),
                },
                TrackRow::NoMatches => self.line("  No matching tracks found"),
            }
        }
    }

    fn offer_download(&self, download: &Download) {
        self.line(&format!("Download {}: {}", download.file_name, download.url));
    }
}

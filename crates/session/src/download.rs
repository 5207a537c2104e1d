use tracing::info;

use satb_domain::{file_name, ArtifactMap, Severity};
use satb_services::TranscriptionBackend;

use crate::{DownloadError, TabOrchestrator};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DownloadKind {
    Audio,
    Notation,
}

/// A file offered to the user for saving.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Download {
    pub part: String,
    pub kind: DownloadKind,
    pub url: String,
    pub file_name: String,
}

/// Picks what to download for `part`: the audio rendering when there is one,
/// otherwise the notation source.
pub fn resolve_download(
    part: &str,
    artifacts: &ArtifactMap,
    backend: &dyn TranscriptionBackend,
) -> Option<Download> {
    if let Some(reference) = artifacts.audio(part) {
        return Some(Download {
            part: part.to_string(),
            kind: DownloadKind::Audio,
            url: backend.audio_url(reference),
            file_name: reference.to_string(),
        });
    }
    artifacts.notation(part).map(|reference| {
        let name = file_name(reference);
        Download {
            part: part.to_string(),
            kind: DownloadKind::Notation,
            url: backend.results_url(name),
            file_name: name.to_string(),
        }
    })
}

impl TabOrchestrator {
    pub fn download_current_part(&self) -> Result<Download, DownloadError> {
        let part = self.current_part();
        let download = resolve_download(&part, &self.artifacts(), self.backend.as_ref());
        let Some(download) = download else {
            let err = DownloadError::NothingAvailable { part };
            self.notifier.notify(&err.to_string(), Severity::Error);
            return Err(err);
        };
        info!(part = %download.part, url = %download.url, "offering download");
        self.view.offer_download(&download);
        let what = match download.kind {
            DownloadKind::Audio => "audio",
            DownloadKind::Notation => "file",
        };
        self.notifier.notify(
            &format!("Downloading {} {what}...", download.part),
            Severity::Success,
        );
        Ok(download)
    }
}

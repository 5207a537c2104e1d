use serde::{Deserialize, Serialize};

pub const NO_TRANSCRIPTION: &str = "No transcription available";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Artist {
    pub name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

/// A matched song returned by the recording pipeline's search step.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackDescriptor {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
}

impl TrackDescriptor {
    pub fn artist_line(&self) -> String {
        self.artists
            .iter()
            .map(|artist| artist.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn link(&self) -> Option<&str> {
        self.external_urls
            .as_ref()
            .and_then(|urls| urls.spotify.as_deref())
    }
}

/// Results of one recording request. Replaced as a whole by the next one.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordingOutcome {
    #[serde(default)]
    pub music_text: Option<String>,
    #[serde(default)]
    pub tracks: Option<Vec<TrackDescriptor>>,
}

impl RecordingOutcome {
    pub fn transcription(&self) -> &str {
        self.music_text.as_deref().unwrap_or(NO_TRANSCRIPTION)
    }

    pub fn rows(&self) -> Vec<TrackRow> {
        track_rows(self.tracks.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackRow {
    Match {
        name: String,
        artists: String,
        /// `None` renders as an inert link.
        link: Option<String>,
    },
    NoMatches,
}

/// One row per track, or a single `NoMatches` row when there is nothing to show.
pub fn track_rows(tracks: Option<&[TrackDescriptor]>) -> Vec<TrackRow> {
    let rows: Vec<TrackRow> = tracks
        .unwrap_or_default()
        .iter()
        .map(|track| TrackRow::Match {
            name: track.name.clone(),
            artists: track.artist_line(),
            link: track.link().map(str::to_owned),
        })
        .collect();
    if rows.is_empty() {
        vec![TrackRow::NoMatches]
    } else {
        rows
    }
}

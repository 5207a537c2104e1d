use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key suffix for a part's playable audio rendering.
pub const AUDIO_SUFFIX: &str = "_audio";
/// Key suffix for a part's MIDI fallback.
pub const MIDI_SUFFIX: &str = "_midi";

pub fn audio_key(part: &str) -> String {
    format!("{part}{AUDIO_SUFFIX}")
}

pub fn midi_key(part: &str) -> String {
    format!("{part}{MIDI_SUFFIX}")
}

/// Last `/`-separated segment of a file reference.
pub fn file_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotationFormat {
    MusicXml,
}

impl NotationFormat {
    /// Recognizes notation sources by extension, ignoring case. Only
    /// `.musicxml` is a notation source.
    pub fn detect(reference: &str) -> Option<Self> {
        let name = file_name(reference).to_ascii_lowercase();
        match name.rsplit_once('.')? {
            (_, "musicxml") => Some(NotationFormat::MusicXml),
            _ => None,
        }
    }
}

/// Part/artifact key to file reference, exactly as the backend returned it.
///
/// Keys follow the convention `"{part}"` for the notation source,
/// `"{part}_audio"` for the rendered audio and `"{part}_midi"` for the MIDI
/// fallback. A map is never edited after it is received; a new upload
/// replaces it as a whole.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ArtifactMap {
    entries: BTreeMap<String, String>,
}

impl ArtifactMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn notation(&self, part: &str) -> Option<&str> {
        self.get(part)
    }

    pub fn audio(&self, part: &str) -> Option<&str> {
        self.get(&audio_key(part))
    }

    pub fn midi(&self, part: &str) -> Option<&str> {
        self.get(&midi_key(part))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Every part with at least one artifact, in key order.
    pub fn parts(&self) -> Vec<&str> {
        let mut parts: Vec<&str> = self
            .entries
            .keys()
            .map(|key| {
                key.strip_suffix(AUDIO_SUFFIX)
                    .or_else(|| key.strip_suffix(MIDI_SUFFIX))
                    .unwrap_or(key)
            })
            .collect();
        parts.sort_unstable();
        parts.dedup();
        parts
    }
}

impl<K, V> FromIterator<(K, V)> for ArtifactMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

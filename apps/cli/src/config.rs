use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use satb_services::BackendConfig;
use satb_session::StudioConfig;

/// Everything the client reads from `client.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub backend: BackendConfig,
    pub studio: StudioConfig,
}

impl ClientConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// An explicit path must exist; the per-user file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!(path = %path.display(), "loading config");
            return Self::from_file(path);
        }
        match default_path() {
            Some(path) if path.is_file() => {
                info!(path = %path.display(), "loading config");
                Self::from_file(&path)
            }
            _ => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }
}

fn default_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("satb").join("client.yaml"))
}

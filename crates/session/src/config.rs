use std::time::Duration;

use serde::{Deserialize, Serialize};

use satb_domain::DEFAULT_PART;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StudioConfig {
    /// Part shown at start-up and after every upload.
    pub default_part: String,
    /// Pause between "Processing complete!" and revealing the results.
    pub reveal_delay_ms: u64,
    /// Recording countdown granularity.
    pub countdown_tick_ms: u64,
}

impl StudioConfig {
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn countdown_tick(&self) -> Duration {
        Duration::from_millis(self.countdown_tick_ms.max(1))
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            default_part: DEFAULT_PART.to_string(),
            reveal_delay_ms: 1000,
            countdown_tick_ms: 1000,
        }
    }
}

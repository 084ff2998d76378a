use serde::{Deserialize, Serialize};

use crate::capabilities::StorageKey;
use crate::error::ConfigError;

pub const DEFAULT_STORAGE_KEY: &str = "waypoints_json";
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_MIN_UPDATE_INTERVAL_MS: u64 = 1_000;

/// Tunables the shell may override with `Event::Configure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Slot holding the JSON array of waypoints.
    pub storage_key: String,
    pub update_interval_ms: u64,
    pub min_update_interval_ms: u64,
    pub high_accuracy: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            min_update_interval_ms: DEFAULT_MIN_UPDATE_INTERVAL_MS,
            high_accuracy: true,
        }
    }
}

impl CoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        StorageKey::parse(&self.storage_key).map_err(ConfigError::StorageKey)?;
        if self.update_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "update_interval_ms",
            });
        }
        if self.min_update_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "min_update_interval_ms",
            });
        }
        if self.min_update_interval_ms > self.update_interval_ms {
            return Err(ConfigError::IntervalOrder {
                min: self.min_update_interval_ms,
                interval: self.update_interval_ms,
            });
        }
        Ok(())
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures of the key-value substrate. Crosses the FFI boundary, so it
/// carries strings rather than source errors.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("value too large: {size} bytes exceeds maximum of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },

    #[error("storage error: {message}")]
    Backend { message: String },

    #[error("encoding error: {message}")]
    Encoding { message: String },

    #[error("lock acquisition failed")]
    LockFailed,
}

#[cfg(not(target_arch = "wasm32"))]
impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend {
            message: e.to_string(),
        }
    }
}

/// Why the location stream went quiet. Always recovered by degrading to
/// `location_enabled = false`.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location provider disabled")]
    ProviderDisabled,

    #[error("location stream ended")]
    StreamEnded,

    #[error("location unavailable: {message}")]
    Unavailable { message: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid storage key: {0}")]
    StorageKey(StoreError),

    #[error("{field} must be > 0")]
    ZeroInterval { field: &'static str },

    #[error("min_update_interval_ms ({min}) exceeds update_interval_ms ({interval})")]
    IntervalOrder { min: u64, interval: u64 },
}

/// Errors surfaced by the native host. The core itself never fails.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("host inbox closed")]
    HostClosed,
}

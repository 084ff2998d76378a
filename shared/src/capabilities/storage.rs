use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub const MAX_KEY_LENGTH: usize = 512;
pub const MAX_VALUE_SIZE: usize = 10 * 1024 * 1024;

/// A validated slot name in the shell's key-value store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    /// Accepts any non-blank name of at most [`MAX_KEY_LENGTH`] bytes
    /// without control characters.
    pub fn parse(key: &str) -> Result<Self, StoreError> {
        let reason = if key.trim().is_empty() {
            Some("blank".to_string())
        } else if key.len() > MAX_KEY_LENGTH {
            Some(format!("longer than {MAX_KEY_LENGTH} bytes"))
        } else if key.chars().any(char::is_control) {
            Some("contains control characters".to_string())
        } else {
            None
        };

        match reason {
            Some(reason) => Err(StoreError::InvalidKey {
                key: key.escape_debug().take(64).collect(),
                reason,
            }),
            None => Ok(Self(key.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Whole-value operations on a single slot. There is no partial update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StorageOperation {
    Get {
        key: StorageKey,
    },
    Replace {
        key: StorageKey,
        #[serde(with = "serde_bytes")]
        value: Vec<u8>,
    },
}

impl StorageOperation {
    pub fn get(key: &str) -> Result<Self, StoreError> {
        Ok(Self::Get {
            key: StorageKey::parse(key)?,
        })
    }

    pub fn replace(key: &str, value: Vec<u8>) -> Result<Self, StoreError> {
        if value.len() > MAX_VALUE_SIZE {
            return Err(StoreError::ValueTooLarge {
                size: value.len(),
                max: MAX_VALUE_SIZE,
            });
        }
        Ok(Self::Replace {
            key: StorageKey::parse(key)?,
            value,
        })
    }

    #[must_use]
    pub fn key(&self) -> &StorageKey {
        match self {
            Self::Get { key } | Self::Replace { key, .. } => key,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StorageOutput {
    Value(#[serde(with = "serde_bytes")] Vec<u8>),
    /// The slot has never been written.
    Missing,
    Written,
}

pub type StorageResult = Result<StorageOutput, StoreError>;

impl Operation for StorageOperation {
    type Output = StorageResult;
}

#[derive(Clone)]
pub struct Storage<Ev> {
    context: CapabilityContext<StorageOperation, Ev>,
}

impl<Ev> Capability<Ev> for Storage<Ev> {
    type Operation = StorageOperation;
    type MappedSelf<MappedEv> = Storage<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Storage::new(self.context.map_event(f))
    }
}

impl<Ev> Storage<Ev>
where
    Ev: Send + 'static,
{
    pub fn new(context: CapabilityContext<StorageOperation, Ev>) -> Self {
        Self { context }
    }

    /// Reads the slot. An invalid key is reported through `make_event`
    /// without reaching the shell.
    pub fn get<F>(&self, key: &str, make_event: F)
    where
        F: FnOnce(StorageResult) -> Ev + Send + 'static,
    {
        match StorageOperation::get(key) {
            Ok(op) => self.request(op, make_event),
            Err(e) => self.context.update_app(make_event(Err(e))),
        }
    }

    /// Overwrites the slot with `value`.
    pub fn replace<F>(&self, key: &str, value: Vec<u8>, make_event: F)
    where
        F: FnOnce(StorageResult) -> Ev + Send + 'static,
    {
        match StorageOperation::replace(key, value) {
            Ok(op) => self.request(op, make_event),
            Err(e) => self.context.update_app(make_event(Err(e))),
        }
    }

    fn request<F>(&self, op: StorageOperation, make_event: F)
    where
        F: FnOnce(StorageResult) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(op).await;
            ctx.update_app(make_event(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_keys_are_rejected() {
        for key in ["", "   ", "\t"] {
            assert!(matches!(
                StorageKey::parse(key),
                Err(StoreError::InvalidKey { .. })
            ));
        }
    }

    #[test]
    fn overlong_key_is_rejected() {
        assert!(StorageKey::parse(&"a".repeat(MAX_KEY_LENGTH)).is_ok());
        assert!(StorageKey::parse(&"a".repeat(MAX_KEY_LENGTH + 1)).is_err());
    }

    #[test]
    fn control_characters_are_rejected() {
        assert!(StorageKey::parse("key\0value").is_err());
        assert!(StorageKey::parse("key\nvalue").is_err());
    }

    #[test]
    fn reported_key_is_escaped_and_bounded() {
        let result = StorageKey::parse(&"\u{1}".repeat(100));
        let Err(StoreError::InvalidKey { key, .. }) = result else {
            panic!("expected InvalidKey, got {result:?}");
        };
        assert!(key.len() <= 64);
        assert!(!key.contains('\u{1}'));
    }

    #[test]
    fn default_slot_name_is_valid() {
        let key = StorageKey::parse("waypoints_json").unwrap();
        assert_eq!(key.as_str(), "waypoints_json");
    }

    #[test]
    fn replace_rejects_oversized_value() {
        let result = StorageOperation::replace("k", vec![0u8; MAX_VALUE_SIZE + 1]);
        assert!(matches!(result, Err(StoreError::ValueTooLarge { .. })));
    }

    #[test]
    fn operation_exposes_key() {
        let op = StorageOperation::replace("waypoints_json", b"[]".to_vec()).unwrap();
        assert_eq!(op.key().as_str(), "waypoints_json");
    }

    #[test]
    fn key_serializes_as_plain_string() {
        let op = StorageOperation::get("waypoints_json").unwrap();
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["Get"]["key"], "waypoints_json");
    }
}

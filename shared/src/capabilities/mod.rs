mod location;
mod storage;

pub use self::location::{Fix, Location, LocationOperation, LocationResponse};
pub use self::storage::{
    Storage, StorageKey, StorageOperation, StorageOutput, StorageResult, MAX_KEY_LENGTH,
    MAX_VALUE_SIZE,
};

/// Render capability re-export.
///
/// Crux's built-in Render covers view refreshes.
pub use crux_core::render::Render;

use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub storage: Storage<Event>,
    pub location: Location<Event>,
}

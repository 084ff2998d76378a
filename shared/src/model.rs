use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::config::CoreConfig;

/// Opaque waypoint identifier. Generated once at creation and never changed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaypointId(pub String);

impl WaypointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WaypointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Explicit timestamp unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct UnixTimeMs(pub u64);

impl UnixTimeMs {
    #[must_use]
    pub fn now() -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self(ms)
    }

    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }
}

/// A plain lat/lon pair. Not range-checked: map coordinates are accepted as given.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// A user-created point of interest.
///
/// The serialized field names match what earlier app versions wrote to the
/// `waypoints_json` slot. Missing `id`/`timestamp`/`notes` are filled in the
/// same way those versions did on decode.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Waypoint {
    #[serde(default = "WaypointId::generate")]
    pub id: WaypointId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "UnixTimeMs::now")]
    pub timestamp: UnixTimeMs,
    #[serde(default)]
    pub notes: String,
}

impl Waypoint {
    #[must_use]
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Selection/edit automaton, derived from `WaypointState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionPhase {
    Idle,
    Viewing,
    Editing,
}

/// The application state owned by the core.
///
/// Every transition in `controller` builds a fresh value; nothing mutates a
/// `WaypointState` in place.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WaypointState {
    /// Insertion order; source of truth for rendering and persistence.
    pub waypoints: Vec<Waypoint>,
    pub user_location: Option<GeoPoint>,
    pub location_enabled: bool,
    pub selected_id: Option<WaypointId>,
    pub is_editing: bool,
    pub show_hint: bool,
    pub recenter_requested: bool,
    /// Sticky: set by the first fix and never cleared.
    pub has_centered_on_user: bool,
}

impl Default for WaypointState {
    fn default() -> Self {
        Self {
            waypoints: Vec::new(),
            user_location: None,
            location_enabled: false,
            selected_id: None,
            is_editing: false,
            show_hint: true,
            recenter_requested: false,
            has_centered_on_user: false,
        }
    }
}

impl WaypointState {
    #[must_use]
    pub fn find(&self, id: &WaypointId) -> Option<&Waypoint> {
        self.waypoints.iter().find(|wp| &wp.id == id)
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Waypoint> {
        self.selected_id.as_ref().and_then(|id| self.find(id))
    }

    #[must_use]
    pub fn selection_phase(&self) -> SelectionPhase {
        match (&self.selected_id, self.is_editing) {
            (None, _) => SelectionPhase::Idle,
            (Some(_), false) => SelectionPhase::Viewing,
            (Some(_), true) => SelectionPhase::Editing,
        }
    }
}

/// Location permission as last reported by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PermissionState {
    #[default]
    Unknown,
    Granted,
    Denied,
}

/// Crux model: the application state plus bookkeeping that never reaches the view.
#[derive(Debug, Default)]
pub struct Model {
    pub state: WaypointState,
    pub config: CoreConfig,
    pub location_permission: PermissionState,
    /// Generation of the live location subscription, if any.
    pub location_subscription: Option<u32>,
    pub subscriptions_started: u32,
}

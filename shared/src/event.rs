use serde::{Deserialize, Serialize};

use crate::capabilities::{LocationResponse, StorageResult};
use crate::config::CoreConfig;
use crate::model::WaypointId;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Lifecycle
    Configure {
        config: CoreConfig,
    },
    Initialize,
    ReloadRequested,

    // Location
    LocationPermissionResult {
        fine: bool,
        coarse: bool,
    },
    StartLocationUpdates,
    StopLocationUpdates,
    LastKnownLocationRequested,

    // Waypoints
    AddWaypoint {
        latitude: f64,
        longitude: f64,
    },
    SelectWaypoint {
        id: Option<WaypointId>,
    },
    StartEditing,
    CancelEditing,
    SaveEdit {
        id: WaypointId,
        name: String,
        notes: String,
    },
    DeleteWaypoint {
        id: WaypointId,
    },

    // Camera
    RequestRecenter,
    RecenterHandled,

    // Capability responses, never sent by the shell
    #[serde(skip)]
    WaypointsLoaded(Box<StorageResult>),
    #[serde(skip)]
    WaypointsPersisted(Box<StorageResult>),
    #[serde(skip)]
    LocationUpdated {
        subscription: u32,
        response: LocationResponse,
    },
    #[serde(skip)]
    LastKnownLocation(LocationResponse),
}

impl Event {
    /// Variant name for log lines. Never includes payload, so user text
    /// stays out of logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Configure { .. } => "Configure",
            Self::Initialize => "Initialize",
            Self::ReloadRequested => "ReloadRequested",
            Self::LocationPermissionResult { .. } => "LocationPermissionResult",
            Self::StartLocationUpdates => "StartLocationUpdates",
            Self::StopLocationUpdates => "StopLocationUpdates",
            Self::LastKnownLocationRequested => "LastKnownLocationRequested",
            Self::AddWaypoint { .. } => "AddWaypoint",
            Self::SelectWaypoint { .. } => "SelectWaypoint",
            Self::StartEditing => "StartEditing",
            Self::CancelEditing => "CancelEditing",
            Self::SaveEdit { .. } => "SaveEdit",
            Self::DeleteWaypoint { .. } => "DeleteWaypoint",
            Self::RequestRecenter => "RequestRecenter",
            Self::RecenterHandled => "RecenterHandled",
            Self::WaypointsLoaded(_) => "WaypointsLoaded",
            Self::WaypointsPersisted(_) => "WaypointsPersisted",
            Self::LocationUpdated { .. } => "LocationUpdated",
            Self::LastKnownLocation(_) => "LastKnownLocation",
        }
    }

    /// Direct user gestures, as opposed to lifecycle or capability traffic.
    #[must_use]
    pub fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::AddWaypoint { .. }
                | Self::SelectWaypoint { .. }
                | Self::StartEditing
                | Self::CancelEditing
                | Self::SaveEdit { .. }
                | Self::DeleteWaypoint { .. }
                | Self::RequestRecenter
        )
    }
}

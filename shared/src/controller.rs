//! Waypoint lifecycle transitions.
//!
//! Each operation takes the current snapshot by reference and returns the
//! next one. The Crux `App` swaps `Model::state` for the result, so observers
//! only ever see whole snapshots.
//!
//! Selection/edit automaton:
//!
//! ```text
//! Idle --select--> Viewing --start_editing--> Editing
//!  ^                 |  ^                       |
//!  |   select(None)  |  +--cancel / save / select(other)
//!  +-----------------+  delete (from Viewing or Editing) -> Idle
//! ```

use crate::model::{GeoPoint, UnixTimeMs, Waypoint, WaypointId, WaypointState};
use crate::validation::{default_name, sanitize_name, sanitize_notes};

impl WaypointState {
    /// Store emission: replace the list verbatim, no merge. A selection the
    /// new list no longer contains is dropped along with its edit.
    #[must_use]
    pub fn with_loaded(&self, waypoints: Vec<Waypoint>) -> Self {
        let selected_id = self
            .selected_id
            .clone()
            .filter(|id| waypoints.iter().any(|wp| &wp.id == id));
        Self {
            show_hint: waypoints.is_empty(),
            is_editing: self.is_editing && selected_id.is_some(),
            selected_id,
            waypoints,
            ..self.clone()
        }
    }

    /// A fix from the live subscription. Requests a recenter only for the
    /// first fix of the state's lifetime.
    #[must_use]
    pub fn with_location_fix(&self, position: GeoPoint) -> Self {
        let first_fix = !self.has_centered_on_user;
        Self {
            user_location: Some(position),
            location_enabled: true,
            recenter_requested: self.recenter_requested || first_fix,
            has_centered_on_user: true,
            ..self.clone()
        }
    }

    /// Stream failed or ended. The last position stays on screen.
    #[must_use]
    pub fn with_location_lost(&self) -> Self {
        Self {
            location_enabled: false,
            ..self.clone()
        }
    }

    /// One-shot cached position: seeds the display only while nothing better
    /// is known. Does not count as a live fix.
    #[must_use]
    pub fn with_last_known(&self, position: GeoPoint) -> Self {
        if self.user_location.is_some() {
            return self.clone();
        }
        Self {
            user_location: Some(position),
            ..self.clone()
        }
    }

    /// Appends a record named after the current count. Names may repeat
    /// after deletions.
    #[must_use]
    pub fn with_waypoint_added(
        &self,
        id: WaypointId,
        position: GeoPoint,
        created_at: UnixTimeMs,
    ) -> Self {
        let waypoint = Waypoint {
            id,
            name: default_name(self.waypoints.len()),
            latitude: position.latitude,
            longitude: position.longitude,
            timestamp: created_at,
            notes: String::new(),
        };

        let mut waypoints = Vec::with_capacity(self.waypoints.len() + 1);
        waypoints.extend(self.waypoints.iter().cloned());
        waypoints.push(waypoint);

        Self {
            waypoints,
            show_hint: false,
            ..self.clone()
        }
    }

    /// Always leaves edit mode. An id that is not in the list clears the
    /// selection.
    #[must_use]
    pub fn with_selection(&self, id: Option<&WaypointId>) -> Self {
        let selected_id = id.filter(|id| self.find(id).is_some()).cloned();
        Self {
            selected_id,
            is_editing: false,
            ..self.clone()
        }
    }

    /// No effect without a selection.
    #[must_use]
    pub fn with_editing_started(&self) -> Self {
        Self {
            is_editing: self.selected_id.is_some(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_editing_cancelled(&self) -> Self {
        Self {
            is_editing: false,
            ..self.clone()
        }
    }

    /// Applies sanitised name/notes to the matching record and re-points the
    /// selection at it. An unknown id leaves the list as is and clears the
    /// selection.
    #[must_use]
    pub fn with_edit_saved(&self, id: &WaypointId, raw_name: &str, raw_notes: &str) -> Self {
        let name = sanitize_name(raw_name);
        let notes = sanitize_notes(raw_notes);

        let waypoints: Vec<Waypoint> = self
            .waypoints
            .iter()
            .map(|wp| {
                if &wp.id == id {
                    Waypoint {
                        name: name.clone(),
                        notes: notes.clone(),
                        ..wp.clone()
                    }
                } else {
                    wp.clone()
                }
            })
            .collect();

        let selected_id = waypoints
            .iter()
            .find(|wp| &wp.id == id)
            .map(|wp| wp.id.clone());

        Self {
            waypoints,
            is_editing: false,
            selected_id,
            ..self.clone()
        }
    }

    /// Clears selection and edit mode even when `id` matches nothing.
    #[must_use]
    pub fn with_waypoint_deleted(&self, id: &WaypointId) -> Self {
        let waypoints: Vec<Waypoint> = self
            .waypoints
            .iter()
            .filter(|wp| &wp.id != id)
            .cloned()
            .collect();

        Self {
            show_hint: waypoints.is_empty(),
            waypoints,
            selected_id: None,
            is_editing: false,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_recenter_requested(&self) -> Self {
        Self {
            recenter_requested: true,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_recenter_handled(&self) -> Self {
        Self {
            recenter_requested: false,
            ..self.clone()
        }
    }
}

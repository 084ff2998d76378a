use serde::{Deserialize, Serialize};

use crate::geo::{distance_m, format_coordinates, format_distance};
use crate::model::{GeoPoint, Waypoint, WaypointState};

pub const HINT_TEXT: &str = "Long-press to add";
pub const LOCATING_TEXT: &str = "Locating…";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PinView {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub selected: bool,
}

/// Detail card for the selected waypoint.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WaypointCard {
    pub id: String,
    pub name: String,
    pub notes: String,
    pub coordinates: String,
    /// Absent until the user's position is known.
    pub distance: Option<String>,
    pub is_editing: bool,
}

impl WaypointCard {
    fn new(waypoint: &Waypoint, user_location: Option<GeoPoint>, is_editing: bool) -> Self {
        let distance = user_location
            .and_then(|user| distance_m(user, waypoint.position()))
            .and_then(format_distance);
        Self {
            id: waypoint.id.to_string(),
            name: waypoint.name.clone(),
            notes: waypoint.notes.clone(),
            coordinates: format_coordinates(waypoint.position()),
            distance,
            is_editing,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HeaderView {
    pub status: String,
    pub accessibility_label: String,
}

impl HeaderView {
    fn new(user_location: Option<GeoPoint>, location_enabled: bool) -> Self {
        let status = user_location.map_or_else(|| LOCATING_TEXT.to_string(), format_coordinates);
        let accessibility_label = if location_enabled {
            format!("Location ready. {status}")
        } else {
            "Waiting for location".to_string()
        };
        Self {
            status,
            accessibility_label,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RecenterView {
    /// The map should move to `target` and then send `RecenterHandled`.
    pub requested: bool,
    pub target: Option<GeoPoint>,
    pub enabled: bool,
    pub accessibility_label: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ViewModel {
    pub pins: Vec<PinView>,
    pub selected: Option<WaypointCard>,
    pub header: HeaderView,
    pub hint: Option<String>,
    pub recenter: RecenterView,
    pub location_enabled: bool,
    pub waypoint_count: usize,
}

impl From<&WaypointState> for ViewModel {
    fn from(state: &WaypointState) -> Self {
        let selected = state
            .selected()
            .map(|wp| WaypointCard::new(wp, state.user_location, state.is_editing));

        let pins = state
            .waypoints
            .iter()
            .map(|wp| PinView {
                id: wp.id.to_string(),
                latitude: wp.latitude,
                longitude: wp.longitude,
                selected: state.selected_id.as_ref() == Some(&wp.id),
            })
            .collect();

        let hint = (state.show_hint && selected.is_none()).then(|| HINT_TEXT.to_string());

        let recenter = RecenterView {
            requested: state.recenter_requested,
            target: state.user_location,
            enabled: state.location_enabled,
            accessibility_label: if state.location_enabled {
                "Center on my location".to_string()
            } else {
                "Location unavailable".to_string()
            },
        };

        Self {
            pins,
            selected,
            header: HeaderView::new(state.user_location, state.location_enabled),
            hint,
            recenter,
            location_enabled: state.location_enabled,
            waypoint_count: state.waypoints.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{UnixTimeMs, WaypointId};

    fn state_with_one() -> (WaypointState, WaypointId) {
        let state = WaypointState::default().with_waypoint_added(
            WaypointId::new("a"),
            GeoPoint::new(51.5, -0.1),
            UnixTimeMs(1),
        );
        (state, WaypointId::new("a"))
    }

    #[test]
    fn empty_state_shows_hint_and_locating() {
        let view = ViewModel::from(&WaypointState::default());
        assert_eq!(view.hint.as_deref(), Some(HINT_TEXT));
        assert_eq!(view.header.status, LOCATING_TEXT);
        assert_eq!(view.header.accessibility_label, "Waiting for location");
        assert!(!view.recenter.enabled);
        assert!(view.pins.is_empty());
        assert!(view.selected.is_none());
    }

    #[test]
    fn header_formats_known_location() {
        let state = WaypointState::default().with_location_fix(GeoPoint::new(51.5, -0.1));
        let view = ViewModel::from(&state);
        assert_eq!(view.header.status, "51.50000, -0.10000");
        assert_eq!(
            view.header.accessibility_label,
            "Location ready. 51.50000, -0.10000"
        );
        assert!(view.recenter.enabled);
        assert!(view.recenter.requested);
        assert_eq!(view.recenter.target, Some(GeoPoint::new(51.5, -0.1)));
    }

    #[test]
    fn lost_location_keeps_status_but_disables_recenter() {
        let state = WaypointState::default()
            .with_location_fix(GeoPoint::new(1.0, 2.0))
            .with_location_lost();
        let view = ViewModel::from(&state);
        assert_eq!(view.header.status, "1.00000, 2.00000");
        assert_eq!(view.header.accessibility_label, "Waiting for location");
        assert!(!view.recenter.enabled);
        assert_eq!(view.recenter.accessibility_label, "Location unavailable");
    }

    #[test]
    fn selected_card_without_location_has_no_distance() {
        let (state, id) = state_with_one();
        let view = ViewModel::from(&state.with_selection(Some(&id)));
        let card = view.selected.unwrap();
        assert_eq!(card.name, "Waypoint 1");
        assert_eq!(card.coordinates, "51.50000, -0.10000");
        assert_eq!(card.distance, None);
        assert!(!card.is_editing);
        assert!(view.pins[0].selected);
    }

    #[test]
    fn selected_card_shows_distance() {
        let (state, id) = state_with_one();
        let state = state
            .with_location_fix(GeoPoint::new(51.5, -0.1))
            .with_selection(Some(&id))
            .with_editing_started();
        let card = ViewModel::from(&state).selected.unwrap();
        assert_eq!(card.distance.as_deref(), Some("0 m away"));
        assert!(card.is_editing);
    }

    #[test]
    fn hint_hidden_while_selected() {
        let (state, id) = state_with_one();
        let state = WaypointState {
            show_hint: true,
            ..state.with_selection(Some(&id))
        };
        assert!(ViewModel::from(&state).hint.is_none());
    }

    #[test]
    fn pins_follow_list_order() {
        let (state, _) = state_with_one();
        let state = state.with_waypoint_added(WaypointId::new("b"), GeoPoint::new(0.0, 0.0), UnixTimeMs(2));
        let view = ViewModel::from(&state);
        let ids: Vec<&str> = view.pins.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(view.waypoint_count, 2);
        assert!(view.hint.is_none());
    }
}

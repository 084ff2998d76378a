//! Wire format of the persisted list: one JSON array of waypoint records.

use tracing::warn;

use crate::error::StoreError;
use crate::model::Waypoint;

/// Serialises the full list.
///
/// JSON has no representation for NaN or infinity, so a record with a
/// non-finite coordinate is refused instead of being written as `null`.
pub fn encode_waypoints(waypoints: &[Waypoint]) -> Result<Vec<u8>, StoreError> {
    if let Some(wp) = waypoints.iter().find(|wp| !wp.position().is_finite()) {
        return Err(StoreError::Encoding {
            message: format!("waypoint {} has a non-finite coordinate", wp.id),
        });
    }

    serde_json::to_vec(waypoints).map_err(|e| StoreError::Encoding {
        message: e.to_string(),
    })
}

/// Never fails: malformed data reads as "no waypoints yet".
#[must_use]
pub fn decode_waypoints(bytes: &[u8]) -> Vec<Waypoint> {
    if bytes.is_empty() {
        return Vec::new();
    }

    match serde_json::from_slice::<Vec<Waypoint>>(bytes) {
        Ok(waypoints) => waypoints,
        Err(e) => {
            warn!(error = %e, len = bytes.len(), "discarding unreadable waypoint data");
            Vec::new()
        }
    }
}

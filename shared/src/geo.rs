use crate::model::GeoPoint;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in metres on a spherical Earth. `None` when either
/// point has a non-finite coordinate.
#[must_use]
pub fn distance_m(from: GeoPoint, to: GeoPoint) -> Option<f64> {
    if !from.is_finite() || !to.is_finite() {
        return None;
    }
    let (lat1, lat2) = (from.latitude.to_radians(), to.latitude.to_radians());
    let half_dlat = (lat2 - lat1) / 2.0;
    let half_dlon = (to.longitude - from.longitude).to_radians() / 2.0;
    let h = half_dlat.sin().powi(2) + lat1.cos() * lat2.cos() * half_dlon.sin().powi(2);
    Some(2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin())
}

/// "12 m away" below a kilometre, "1.5 km away" above.
#[must_use]
pub fn format_distance(meters: f64) -> Option<String> {
    if !meters.is_finite() || meters < 0.0 {
        return None;
    }

    if meters < 1000.0 {
        Some(format!("{meters:.0} m away"))
    } else {
        Some(format!("{:.1} km away", meters / 1000.0))
    }
}

/// Five decimals, as shown in the map header.
#[must_use]
pub fn format_coordinates(point: GeoPoint) -> String {
    format!("{:.5}, {:.5}", point.latitude, point.longitude)
}

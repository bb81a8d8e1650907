//! Great-circle distance using the haversine formula.
//!
//! Distances are returned in kilometers on a spherical Earth of radius
//! [`EARTH_RADIUS_KM`], rounded to two decimal places. Rounding happens on a
//! non-negative value, so half-up and half-away-from-zero agree.

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Compute the great-circle distance between two points.
///
/// # Arguments
///
/// * `lat1`, `lon1` - First point in decimal degrees
/// * `lat2`, `lon2` - Second point in decimal degrees
///
/// # Returns
///
/// Distance in kilometers, rounded to two decimal places.
///
/// # Examples
///
/// ```
/// use geoschool::distance::haversine_km;
///
/// assert_eq!(haversine_km(0.0, 0.0, 0.0, 1.0), 111.19);
/// assert_eq!(haversine_km(40.0, -75.0, 40.0, -75.0), 0.0);
/// ```
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    // Clamped so rounding noise near antipodes cannot push sqrt(1 - a) to NaN
    let a = ((d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2))
    .min(1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    round_to_hundredths(EARTH_RADIUS_KM * c)
}

/// Round to two decimal places, half away from zero.
fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

//! Coordinate validation and lenient numeric coercion.
//!
//! This module provides the validation rule applied to every stored school
//! and every query point, plus the coercion used to turn loosely-typed
//! request values (JSON numbers, numeric strings, query parameters) into
//! `f64` before validation.
//!
//! # Coordinate Domain
//!
//! - Latitude: -90 to 90 (inclusive)
//! - Longitude: -180 to 180 (inclusive)
//!
//! Values that cannot be coerced become `NaN`, which always fails
//! validation, so callers never have to handle a parse error separately.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::distance::haversine_km;
use crate::error::{GeoError, Result};

/// Validate that coordinates are inside the latitude/longitude domain.
///
/// # Arguments
///
/// * `lat` - Latitude in decimal degrees
/// * `lon` - Longitude in decimal degrees
///
/// # Returns
///
/// `true` if neither value is NaN and both are within their inclusive ranges.
///
/// # Examples
///
/// ```
/// use geoschool::coords::is_valid_coordinate;
///
/// assert!(is_valid_coordinate(90.0, -180.0));
/// assert!(!is_valid_coordinate(90.5, 0.0));
/// assert!(!is_valid_coordinate(f64::NAN, 0.0));
/// ```
pub fn is_valid_coordinate(lat: f64, lon: f64) -> bool {
    // RangeInclusive::contains is false for NaN
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

/// Parse the leading decimal literal of a string, ignoring trailing junk.
///
/// Leading whitespace is skipped. The longest prefix of the form
/// `[+-]digits[.digits][(e|E)[+-]digits]` (or `[+-]Infinity`) is parsed.
/// Returns `NaN` when no such prefix exists.
///
/// # Examples
///
/// ```
/// use geoschool::coords::parse_float;
///
/// assert_eq!(parse_float("40.5"), 40.5);
/// assert_eq!(parse_float("  -75.25abc"), -75.25);
/// assert_eq!(parse_float(".5"), 0.5);
/// assert!(parse_float("north").is_nan());
/// ```
pub fn parse_float(input: &str) -> f64 {
    let s = input.trim_start_matches(is_js_whitespace);
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return f64::NAN;
    }

    // Exponent only counts when at least one digit follows it
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

/// Whitespace as understood by JavaScript's `trim` and `parseFloat`.
///
/// Unicode `White_Space` plus the byte order mark U+FEFF, minus NEL U+0085.
pub fn is_js_whitespace(c: char) -> bool {
    c == '\u{feff}' || (c.is_whitespace() && c != '\u{85}')
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Coerce a loosely-typed JSON value into a coordinate component.
///
/// Numbers pass through and strings go through [`parse_float`]. An array
/// reads as its comma-joined text, so only its first element can supply a
/// number. Anything else (null, booleans, objects) becomes `NaN`.
pub fn coerce_json_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_float(s),
        Value::Array(items) => items.first().map_or(f64::NAN, coerce_json_number),
        _ => f64::NAN,
    }
}

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180).
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting values outside the valid domain.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidCoordinates`] if either value is NaN or
    /// out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if is_valid_coordinate(latitude, longitude) {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(GeoError::InvalidCoordinates {
                lat: latitude,
                lon: longitude,
            })
        }
    }

    /// Great-circle distance to another coordinate in kilometers,
    /// rounded to two decimal places.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        haversine_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const LATS: [f64; 6] = [-90.0, 0.0, 90.0, -91.0, 91.0, f64::NAN];
    const LONS: [f64; 6] = [-180.0, 0.0, 180.0, -181.0, 181.0, f64::NAN];

    #[test]
    fn test_validity_grid() {
        for lat in LATS {
            for lon in LONS {
                let expected = !lat.is_nan()
                    && !lon.is_nan()
                    && lat.abs() <= 90.0
                    && lon.abs() <= 180.0;
                assert_eq!(
                    is_valid_coordinate(lat, lon),
                    expected,
                    "lat={lat}, lon={lon}"
                );
            }
        }
    }

    #[test]
    fn test_boundaries_are_valid() {
        assert!(is_valid_coordinate(-90.0, -180.0));
        assert!(is_valid_coordinate(90.0, 180.0));
        assert!(is_valid_coordinate(-90.0, 180.0));
        assert!(is_valid_coordinate(90.0, -180.0));
    }

    #[test]
    fn test_just_outside_boundaries() {
        assert!(!is_valid_coordinate(90.000001, 0.0));
        assert!(!is_valid_coordinate(-90.000001, 0.0));
        assert!(!is_valid_coordinate(0.0, 180.000001));
        assert!(!is_valid_coordinate(0.0, -180.000001));
    }

    #[test]
    fn test_infinity_is_invalid() {
        assert!(!is_valid_coordinate(f64::INFINITY, 0.0));
        assert!(!is_valid_coordinate(0.0, f64::NEG_INFINITY));
    }

    #[test]
    fn test_parse_float_plain() {
        assert_eq!(parse_float("40"), 40.0);
        assert_eq!(parse_float("-75.5"), -75.5);
        assert_eq!(parse_float("+12.25"), 12.25);
        assert_eq!(parse_float("5."), 5.0);
        assert_eq!(parse_float(".25"), 0.25);
        assert_eq!(parse_float("1e2"), 100.0);
        assert_eq!(parse_float("1.5E-1"), 0.15);
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float("  40.7abc"), 40.7);
        assert_eq!(parse_float("12,5"), 12.0);
        assert_eq!(parse_float("1e"), 1.0);
        assert_eq!(parse_float("1e+"), 1.0);
        assert_eq!(parse_float("0x10"), 0.0);
        assert_eq!(parse_float("2.5.3"), 2.5);
    }

    #[test]
    fn test_parse_float_infinity() {
        assert_eq!(parse_float("Infinity"), f64::INFINITY);
        assert_eq!(parse_float("-Infinity"), f64::NEG_INFINITY);
        assert_eq!(parse_float("+Infinityx"), f64::INFINITY);
    }

    #[test]
    fn test_parse_float_nan() {
        assert!(parse_float("").is_nan());
        assert!(parse_float("   ").is_nan());
        assert!(parse_float("abc").is_nan());
        assert!(parse_float(".").is_nan());
        assert!(parse_float("-").is_nan());
        assert!(parse_float("-.e5").is_nan());
        assert!(parse_float("NaN").is_nan());
    }

    #[test]
    fn test_coerce_json_number() {
        assert_eq!(coerce_json_number(&json!(40.0)), 40.0);
        assert_eq!(coerce_json_number(&json!(-75)), -75.0);
        assert_eq!(coerce_json_number(&json!("12.5")), 12.5);
        assert!(coerce_json_number(&json!(null)).is_nan());
        assert!(coerce_json_number(&json!(true)).is_nan());
        assert!(coerce_json_number(&json!([])).is_nan());
        assert!(coerce_json_number(&json!([null, 1.0])).is_nan());
        assert!(coerce_json_number(&json!({"lat": 1.0})).is_nan());
    }

    #[test]
    fn test_coerce_json_array_uses_first_element() {
        assert_eq!(coerce_json_number(&json!([40])), 40.0);
        assert_eq!(coerce_json_number(&json!(["12.5", "99"])), 12.5);
        assert_eq!(coerce_json_number(&json!([[-75.25, 3], 1])), -75.25);
    }

    #[test]
    fn test_js_whitespace_set() {
        assert!(is_js_whitespace(' '));
        assert!(is_js_whitespace('\t'));
        assert!(is_js_whitespace('\u{a0}'));
        assert!(is_js_whitespace('\u{feff}'));
        assert!(!is_js_whitespace('\u{85}'));
        assert!(!is_js_whitespace('a'));
    }

    #[test]
    fn test_parse_float_skips_bom_but_not_nel() {
        assert_eq!(parse_float("\u{feff}42.5"), 42.5);
        assert!(parse_float("\u{85}42.5").is_nan());
    }

    #[test]
    fn test_coordinate_new() {
        let c = Coordinate::new(40.0, -75.0).unwrap();
        assert_eq!(c.latitude, 40.0);
        assert_eq!(c.longitude, -75.0);

        assert!(matches!(
            Coordinate::new(95.0, 0.0),
            Err(GeoError::InvalidCoordinates { .. })
        ));
        assert!(Coordinate::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_coordinate_distance_to() {
        let a = Coordinate::new(0.0, 0.0).unwrap();
        let b = Coordinate::new(0.0, 1.0).unwrap();
        assert_eq!(a.distance_to(&b), 111.19);
        assert_eq!(b.distance_to(&a), 111.19);
    }
}

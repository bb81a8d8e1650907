//! Error types for the geoschool library.

use thiserror::Error;

/// Errors that can occur when validating coordinates or touching the store.
#[derive(Error, Debug)]
pub enum GeoError {
    /// Coordinates are outside the valid latitude/longitude domain.
    #[error("Invalid coordinates: lat={lat}, lon={lon} (valid: lat ±90°, lon ±180°)")]
    InvalidCoordinates { lat: f64, lon: f64 },

    /// Name or address was empty after trimming.
    #[error("School {field} cannot be empty")]
    EmptyField { field: &'static str },

    /// The underlying SQLite store failed.
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// The store connection lock was poisoned by a panicking request.
    #[error("Store connection is unavailable")]
    StorePoisoned,
}

/// Result type alias using [`GeoError`].
pub type Result<T> = std::result::Result<T, GeoError>;

//! # geoschool - School locations and distances
//!
//! Core logic for a school directory keyed by geographic coordinates:
//! validating latitude/longitude pairs, computing great-circle distances
//! with the haversine formula, and storing school records.
//!
//! ## Quick Start
//!
//! ```
//! use geoschool::{rank_by_distance, Coordinate, NewSchool, SchoolStore, SqliteSchoolStore};
//!
//! let store = SqliteSchoolStore::open_in_memory()?;
//! let location = Coordinate::new(40.0, -75.0)?;
//! store.insert(&NewSchool::new("Alpha", "1 Main St", location)?)?;
//!
//! let origin = Coordinate::new(40.0, -75.1)?;
//! let ranked = rank_by_distance(&origin, store.list_all()?);
//! assert_eq!(ranked[0].school.name, "Alpha");
//! # Ok::<(), geoschool::GeoError>(())
//! ```
//!
//! ## Distances
//!
//! Distances are kilometers on a sphere of radius 6371 km, rounded to two
//! decimal places.

pub mod coords;
pub mod distance;
pub mod error;
pub mod school;
pub mod store;

// Re-export main types at crate root for convenience
pub use coords::{
    coerce_json_number, is_js_whitespace, is_valid_coordinate, parse_float, Coordinate,
};
pub use distance::{haversine_km, EARTH_RADIUS_KM};
pub use error::{GeoError, Result};
pub use school::{rank_by_distance, NewSchool, School, SchoolWithDistance};
pub use store::{SchoolStore, SqliteSchoolStore};

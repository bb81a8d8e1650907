//! School records and distance ranking.

use serde::{Deserialize, Serialize};

use crate::coords::{is_js_whitespace, Coordinate};
use crate::error::{GeoError, Result};

/// A persisted school.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    /// Server-generated identifier.
    pub id: i64,
    /// School name, trimmed.
    pub name: String,
    /// Street address, trimmed.
    pub address: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl School {
    /// The school's location.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// A validated school that has not been stored yet.
///
/// Construct with [`NewSchool::new`]; fields are read-only so a value of
/// this type always satisfies the stored-record invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSchool {
    name: String,
    address: String,
    location: Coordinate,
}

impl NewSchool {
    /// Trim `name` and `address` and pair them with a validated location.
    ///
    /// Trimming uses [`is_js_whitespace`], so a byte order mark counts as
    /// whitespace and NEL (U+0085) does not.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::EmptyField`] if either string is empty after trimming.
    pub fn new(name: &str, address: &str, location: Coordinate) -> Result<Self> {
        let name = name.trim_matches(is_js_whitespace);
        let address = address.trim_matches(is_js_whitespace);

        if name.is_empty() {
            return Err(GeoError::EmptyField { field: "name" });
        }
        if address.is_empty() {
            return Err(GeoError::EmptyField { field: "address" });
        }

        Ok(Self {
            name: name.to_string(),
            address: address.to_string(),
            location,
        })
    }

    /// Trimmed school name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trimmed street address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Validated location.
    pub fn location(&self) -> Coordinate {
        self.location
    }

    /// Attach the identifier assigned by the store.
    pub fn with_id(self, id: i64) -> School {
        School {
            id,
            name: self.name,
            address: self.address,
            latitude: self.location.latitude,
            longitude: self.location.longitude,
        }
    }
}

/// A school annotated with its distance from a query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchoolWithDistance {
    #[serde(flatten)]
    pub school: School,
    /// Distance from the query point in kilometers, two decimals.
    pub distance: f64,
}

/// Annotate every school with its distance from `origin` and sort nearest first.
///
/// The sort is stable: schools at the same distance keep their input order.
pub fn rank_by_distance(origin: &Coordinate, schools: Vec<School>) -> Vec<SchoolWithDistance> {
    let mut ranked: Vec<SchoolWithDistance> = schools
        .into_iter()
        .map(|school| {
            let distance = origin.distance_to(&school.coordinate());
            SchoolWithDistance { school, distance }
        })
        .collect();

    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked
}

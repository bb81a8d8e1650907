//! HTTP request handlers for the school service.

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use geoschool::{
    coerce_json_number, parse_float, rank_by_distance, Coordinate, NewSchool, School,
    SchoolWithDistance,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::error::{ApiError, ErrorResponse, ValidationError};
use crate::AppState;

/// Request body for adding a school.
///
/// Coordinates may also be sent as numeric strings.
#[derive(Debug, Serialize, ToSchema)]
pub struct AddSchoolRequest {
    /// School name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Latitude in decimal degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180).
    pub longitude: f64,
}

/// Successful add-school response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddSchoolResponse {
    /// Confirmation message.
    pub message: String,
    /// Identifier assigned to the new school.
    pub school_id: i64,
    /// The stored school.
    #[schema(value_type = Object)]
    pub school: School,
}

/// Query parameters for listing schools.
#[derive(Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListSchoolsQuery {
    /// Latitude of the caller in decimal degrees (-90 to 90).
    pub latitude: Option<String>,
    /// Longitude of the caller in decimal degrees (-180 to 180).
    pub longitude: Option<String>,
}

impl ListSchoolsQuery {
    /// Read the query point from a raw query string.
    ///
    /// Repeated keys keep their first value; unknown keys are ignored.
    pub fn from_raw_query(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        let Some(raw) = raw else {
            return query;
        };

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let slot = match key.as_ref() {
                "latitude" => &mut query.latitude,
                "longitude" => &mut query.longitude,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        query
    }
}

/// Successful list-schools response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListSchoolsResponse {
    /// Confirmation message.
    pub message: String,
    /// The query point.
    #[schema(value_type = Object)]
    pub user_location: Coordinate,
    /// Number of schools returned.
    pub total_schools: usize,
    /// Schools with a `distance` field in kilometers, nearest first.
    #[schema(value_type = Vec<Object>)]
    pub schools: Vec<SchoolWithDistance>,
}

/// Endpoints advertised by the banner.
#[derive(Debug, Serialize, ToSchema)]
pub struct Endpoints {
    #[serde(rename = "POST /api/addSchool")]
    pub add_school: String,
    #[serde(rename = "GET /api/listSchools")]
    pub list_schools: String,
}

/// Service banner response.
#[derive(Debug, Serialize, ToSchema)]
pub struct BannerResponse {
    /// Service status message.
    pub message: String,
    /// API version.
    pub version: String,
    /// Available endpoints.
    pub endpoints: Endpoints,
}

/// Add a school.
///
/// Accepts a JSON body, or a form-encoded body where every field is a string.
///
/// # Returns
///
/// - `201 Created` with the stored school
/// - `400 Bad Request` if a field is missing, mistyped, empty, or the
///   coordinates are out of range
/// - `500 Internal Server Error` if the store fails
#[utoipa::path(
    post,
    path = "/api/addSchool",
    tag = "schools",
    request_body = AddSchoolRequest,
    responses(
        (status = 201, description = "School added", body = AddSchoolResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn add_school(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<AddSchoolResponse>), ApiError> {
    let fields = parse_body(&headers, &body)?;
    let new_school = validate_new_school(&fields)?;

    let id = state.store.insert(&new_school)?;
    let school = new_school.with_id(id);

    tracing::info!(
        id,
        name = %school.name,
        lat = school.latitude,
        lon = school.longitude,
        "School added"
    );

    Ok((
        StatusCode::CREATED,
        Json(AddSchoolResponse {
            message: "School added successfully".to_string(),
            school_id: id,
            school,
        }),
    ))
}

/// List every school sorted by distance from the caller.
///
/// # Query Parameters
///
/// - `latitude`: Latitude in decimal degrees (-90 to 90)
/// - `longitude`: Longitude in decimal degrees (-180 to 180)
///
/// # Returns
///
/// - `200 OK` with schools sorted nearest first
/// - `400 Bad Request` if a parameter is missing or out of range
/// - `500 Internal Server Error` if the store fails
#[utoipa::path(
    get,
    path = "/api/listSchools",
    tag = "schools",
    params(ListSchoolsQuery),
    responses(
        (status = 200, description = "Schools sorted by distance", body = ListSchoolsResponse),
        (status = 400, description = "Invalid query point", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_schools(
    State(state): State<Arc<AppState>>,
    RawQuery(raw): RawQuery,
) -> Result<Json<ListSchoolsResponse>, ApiError> {
    let query = ListSchoolsQuery::from_raw_query(raw.as_deref());
    let origin = validate_query_point(&query)?;

    let schools = rank_by_distance(&origin, state.store.list_all()?);

    tracing::debug!(
        lat = origin.latitude,
        lon = origin.longitude,
        total = schools.len(),
        "Schools listed"
    );

    Ok(Json(ListSchoolsResponse {
        message: "Schools retrieved successfully".to_string(),
        user_location: origin,
        total_schools: schools.len(),
        schools,
    }))
}

/// Service banner.
///
/// Describes the available endpoints; doubles as a health check.
#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses((status = 200, description = "Service is running", body = BannerResponse))
)]
pub async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "School Management API is running!".to_string(),
        version: "1.0.0".to_string(),
        endpoints: Endpoints {
            add_school: "Add a new school".to_string(),
            list_schools: "Get all schools sorted by distance from user location".to_string(),
        },
    })
}

/// Fallback for unknown routes and unsupported methods.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::with_message(
            "Route not found",
            "The requested endpoint does not exist",
        )),
    )
}

/// Decode a request body into a field map.
///
/// Only `application/json` and form bodies are read; any other content type
/// yields no fields, as does an empty body or JSON that is not an object.
/// Form fields are strings, and a repeated form key keeps its first value.
fn parse_body(headers: &HeaderMap, body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    let mime = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .map(|mime| mime.trim().to_ascii_lowercase());

    match mime.as_deref() {
        Some("application/x-www-form-urlencoded") => {
            let mut fields = Map::new();
            for (key, value) in url::form_urlencoded::parse(body) {
                fields
                    .entry(key.into_owned())
                    .or_insert_with(|| Value::String(value.into_owned()));
            }
            Ok(fields)
        }
        Some("application/json") => {
            if body.iter().all(u8::is_ascii_whitespace) {
                return Ok(Map::new());
            }
            match serde_json::from_slice::<Value>(body).map_err(ApiError::InvalidJson)? {
                Value::Object(map) => Ok(map),
                _ => Ok(Map::new()),
            }
        }
        _ => {
            tracing::debug!(content_type = ?mime, "Ignoring body with unsupported content type");
            Ok(Map::new())
        }
    }
}

/// Loose truthiness: null, false, zero and the empty string are falsy.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Validate an add-school body, checking presence, types, coordinates and
/// emptiness in that order.
pub fn validate_new_school(fields: &Map<String, Value>) -> Result<NewSchool, ValidationError> {
    let name = fields.get("name");
    let address = fields.get("address");
    let (Some(latitude), Some(longitude)) = (fields.get("latitude"), fields.get("longitude"))
    else {
        return Err(ValidationError::MissingFields);
    };
    if !is_truthy(name) || !is_truthy(address) {
        return Err(ValidationError::MissingFields);
    }

    let (Some(name), Some(address)) = (
        name.and_then(Value::as_str),
        address.and_then(Value::as_str),
    ) else {
        return Err(ValidationError::NotStrings);
    };

    let location = Coordinate::new(coerce_json_number(latitude), coerce_json_number(longitude))
        .map_err(|_| ValidationError::InvalidCoordinates)?;

    NewSchool::new(name, address, location).map_err(|_| ValidationError::EmptyNameOrAddress)
}

/// Validate the list-schools query point.
pub fn validate_query_point(query: &ListSchoolsQuery) -> Result<Coordinate, ValidationError> {
    let (Some(latitude), Some(longitude)) = (
        query.latitude.as_deref().filter(|s| !s.is_empty()),
        query.longitude.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return Err(ValidationError::MissingQueryCoordinates);
    };

    Coordinate::new(parse_float(latitude), parse_float(longitude))
        .map_err(|_| ValidationError::InvalidCoordinates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_validate_accepts_numbers_and_strings() {
        let school = validate_new_school(&fields(json!({
            "name": " Alpha ",
            "address": "1 Main St",
            "latitude": "40.5",
            "longitude": -75
        })))
        .unwrap();
        assert_eq!(school.name(), "Alpha");
        assert_eq!(school.location(), Coordinate::new(40.5, -75.0).unwrap());
    }

    #[test]
    fn test_validate_missing_fields() {
        let cases = [
            json!({}),
            json!({"name": "A", "address": "B", "latitude": 1.0}),
            json!({"name": "", "address": "B", "latitude": 1.0, "longitude": 1.0}),
            json!({"name": "A", "address": null, "latitude": 1.0, "longitude": 1.0}),
            json!({"name": 0, "address": "B", "latitude": 1.0, "longitude": 1.0}),
            json!({"name": false, "address": "B", "latitude": 1.0, "longitude": 1.0}),
        ];
        for case in cases {
            assert_eq!(
                validate_new_school(&fields(case.clone())),
                Err(ValidationError::MissingFields),
                "{case}"
            );
        }
    }

    #[test]
    fn test_validate_not_strings() {
        let case = json!({"name": 42, "address": "B", "latitude": 1.0, "longitude": 1.0});
        assert_eq!(
            validate_new_school(&fields(case)),
            Err(ValidationError::NotStrings)
        );
        let case = json!({"name": "A", "address": ["B"], "latitude": 1.0, "longitude": 1.0});
        assert_eq!(
            validate_new_school(&fields(case)),
            Err(ValidationError::NotStrings)
        );
    }

    #[test]
    fn test_validate_null_coordinate_is_invalid_not_missing() {
        let case = json!({"name": "A", "address": "B", "latitude": null, "longitude": 1.0});
        assert_eq!(
            validate_new_school(&fields(case)),
            Err(ValidationError::InvalidCoordinates)
        );
    }

    #[test]
    fn test_validate_coordinates_checked_before_emptiness() {
        let case = json!({"name": "  ", "address": "B", "latitude": 95, "longitude": 1.0});
        assert_eq!(
            validate_new_school(&fields(case)),
            Err(ValidationError::InvalidCoordinates)
        );
        let case = json!({"name": "  ", "address": "B", "latitude": 45, "longitude": 1.0});
        assert_eq!(
            validate_new_school(&fields(case)),
            Err(ValidationError::EmptyNameOrAddress)
        );
    }

    #[test]
    fn test_validate_query_point() {
        let query = ListSchoolsQuery {
            latitude: Some("40".to_string()),
            longitude: Some("-75".to_string()),
        };
        assert_eq!(
            validate_query_point(&query),
            Ok(Coordinate::new(40.0, -75.0).unwrap())
        );

        let query = ListSchoolsQuery {
            latitude: Some("40".to_string()),
            longitude: Some(String::new()),
        };
        assert_eq!(
            validate_query_point(&query),
            Err(ValidationError::MissingQueryCoordinates)
        );

        let query = ListSchoolsQuery {
            latitude: Some("abc".to_string()),
            longitude: Some("0".to_string()),
        };
        assert_eq!(
            validate_query_point(&query),
            Err(ValidationError::InvalidCoordinates)
        );
    }

    #[test]
    fn test_parse_body_form() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded".parse().unwrap(),
        );
        let map = parse_body(&headers, b"name=Alpha+School&latitude=40.5").unwrap();
        assert_eq!(map["name"], "Alpha School");
        assert_eq!(map["latitude"], "40.5");
    }

    fn content_type(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_parse_body_ignores_other_content_types() {
        let body = br#"{"name": "Alpha"}"#;
        assert!(parse_body(&HeaderMap::new(), body).unwrap().is_empty());
        assert!(parse_body(&content_type("text/plain"), body)
            .unwrap()
            .is_empty());
        let map = parse_body(&content_type("Application/JSON; charset=utf-8"), body).unwrap();
        assert_eq!(map["name"], "Alpha");
    }

    #[test]
    fn test_parse_body_form_keeps_first_repeated_key() {
        let headers = content_type("application/x-www-form-urlencoded");
        let map = parse_body(&headers, b"name=First&name=Second").unwrap();
        assert_eq!(map["name"], "First");
    }

    #[test]
    fn test_list_query_from_raw() {
        let query = ListSchoolsQuery::from_raw_query(Some(
            "latitude=40&latitude=41&longitude=-75&extra=1",
        ));
        assert_eq!(query.latitude.as_deref(), Some("40"));
        assert_eq!(query.longitude.as_deref(), Some("-75"));

        let query = ListSchoolsQuery::from_raw_query(Some("latitude=%2B40.5"));
        assert_eq!(query.latitude.as_deref(), Some("+40.5"));
        assert!(query.longitude.is_none());

        let query = ListSchoolsQuery::from_raw_query(None);
        assert!(query.latitude.is_none() && query.longitude.is_none());
    }

    #[test]
    fn test_parse_body_json_variants() {
        let headers = content_type("application/json");
        assert!(parse_body(&headers, b"").unwrap().is_empty());
        assert!(parse_body(&headers, b"[1, 2]").unwrap().is_empty());
        assert!(matches!(
            parse_body(&headers, b"{not json"),
            Err(ApiError::InvalidJson(_))
        ));
        let map = parse_body(&headers, br#"{"name": "Alpha"}"#).unwrap();
        assert_eq!(map["name"], "Alpha");
    }

    #[test]
    fn test_banner_serialize() {
        let json = serde_json::to_value(Endpoints {
            add_school: "a".to_string(),
            list_schools: "b".to_string(),
        })
        .unwrap();
        assert_eq!(json["POST /api/addSchool"], "a");
        assert_eq!(json["GET /api/listSchools"], "b");
    }
}

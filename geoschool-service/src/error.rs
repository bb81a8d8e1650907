//! Error responses for the HTTP API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use geoschool::GeoError;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Reasons a request is rejected before it reaches the store.
///
/// The `Display` strings are the exact messages returned to callers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("All fields are required: name, address, latitude, longitude")]
    MissingFields,

    #[error("Name and address must be strings")]
    NotStrings,

    #[error("Invalid coordinates. Latitude must be between -90 and 90, longitude between -180 and 180")]
    InvalidCoordinates,

    #[error("Name and address cannot be empty")]
    EmptyNameOrAddress,

    #[error("Latitude and longitude query parameters are required")]
    MissingQueryCoordinates,
}

/// Error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Additional detail, present only for routing and panic errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    /// An error body with no extra detail.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    /// An error body carrying a human-readable `message`.
    pub fn with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
        }
    }
}

/// Errors returned by the API handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request body was not valid JSON.
    #[error("Invalid JSON body")]
    InvalidJson(#[source] serde_json::Error),

    /// The store or another internal component failed.
    #[error("Internal server error")]
    Internal(#[from] GeoError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(e) => {
                tracing::debug!(reason = %e, "Request rejected");
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidJson(e) => {
                tracing::debug!(error = %e, "Malformed JSON body");
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal(e) => {
                // Details stay in the server log
                tracing::error!(error = %e, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

//! Standardized API responses.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use punchout::SetupOutcome;
use serde::{Deserialize, Serialize};
use telemetry::{ComponentHealthReport, MetricsSnapshot};

/// Content type of every cXML response.
pub const CXML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// A cXML body with its HTTP status.
#[derive(Debug)]
pub struct CxmlResponse {
    pub status: StatusCode,
    pub body: String,
}

impl CxmlResponse {
    pub fn new(status: u16, body: String) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body,
        }
    }
}

impl From<SetupOutcome> for CxmlResponse {
    fn from(outcome: SetupOutcome) -> Self {
        Self::new(outcome.status, outcome.body)
    }
}

impl IntoResponse for CxmlResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, CXML_CONTENT_TYPE)],
            self.body,
        )
            .into_response()
    }
}

/// Successful session redemption.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token_type: String,
    pub access_token: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
    /// The redeemed session id
    pub refresh_token: String,
}

impl LoginResponse {
    pub fn bearer(access_token: String, expires_in: i64, refresh_token: String) -> Self {
        Self {
            token_type: "Bearer".to_string(),
            access_token,
            expires_in,
            refresh_token,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub store_connected: bool,
    pub components: Vec<ComponentHealthReport>,
    pub metrics: MetricsSnapshot,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// JSON API error.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    pub fn with_code(status: StatusCode, code: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new(msg, code),
        }
    }

    /// A JSON body that could not be read.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, "REQUEST_001", msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<storefront_core::Error> for ApiError {
    fn from(err: storefront_core::Error) -> Self {
        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        ApiError::with_code(status, err.error_code(), err.public_message())
    }
}

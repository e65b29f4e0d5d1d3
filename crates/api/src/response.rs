//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Success response for a log append.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogResponse {
    pub success: bool,
    pub timestamp: i64,
}

impl LogResponse {
    pub fn success() -> Self {
        Self {
            success: true,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Share-open count for one filter.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShareCount {
    pub filter: String,
    pub count: u64,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub storage_connected: bool,
    pub events_appended: u64,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }
}

/// API error carrying the status and coded body.
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

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, "VALID_001", msg)
    }

    pub fn missing_param(name: &str) -> Self {
        Self::validation(
            StatusCode::BAD_REQUEST,
            "VALID_001",
            vec![format!("missing required parameter: {}", name)],
        )
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", msg)
    }

    pub fn validation(status: StatusCode, code: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            status,
            response: ErrorResponse::new("Validation failed", code).with_details(errors),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<analytics_core::Error> for ApiError {
    fn from(err: analytics_core::Error) -> Self {
        use analytics_core::Error;

        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match &err {
            Error::ValidationWithCode { code, message, .. } => {
                ApiError::validation(status, *code, vec![message.clone()])
            }
            Error::Database { code, message, .. } => ApiError::with_code(status, *code, message),
            Error::Validation(_) | Error::MissingField(_) | Error::Serialization(_) => {
                ApiError::bad_request(err.to_string())
            }
            Error::Transport(msg) => ApiError::with_code(status, "TRANSPORT", msg),
            Error::Storage(_) | Error::Internal(_) => ApiError::internal(err.to_string()),
        }
    }
}

//! Common API types and utilities

use axum::extract::multipart::Field;
use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use tracing::error;

use crate::error::PlatformError;

/// Standard API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Success acknowledgement with a message
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type ApiResult<T> = Result<Json<T>, PlatformError>;

impl PlatformError {
    /// HTTP status this error maps to at the API boundary.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Duplicate { .. }
            | Self::Validation { .. }
            | Self::InvalidCredentials
            | Self::InvalidAssertion { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::InvalidToken { .. } | Self::TokenExpired => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Duplicate { .. } => "CONFLICT",
            Self::Validation { .. } => "VALIDATION",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidAssertion { .. } => "INVALID_ASSERTION",
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::InvalidToken { .. } | Self::TokenExpired => "FORBIDDEN",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Store and serialization failures surface as a generic 500;
        // the detail stays in the log.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
            "Server error".to_string()
        } else {
            self.to_string()
        };

        let body = ApiError {
            error: self.code().to_string(),
            message,
            details: None,
        };
        (status, Json(body)).into_response()
    }
}

pub(crate) async fn next_field<'a>(
    multipart: &'a mut Multipart,
) -> Result<Option<Field<'a>>, PlatformError> {
    multipart
        .next_field()
        .await
        .map_err(|e| PlatformError::validation(format!("Malformed form data: {e}")))
}

pub(crate) async fn field_text(field: Field<'_>) -> Result<String, PlatformError> {
    field
        .text()
        .await
        .map_err(|e| PlatformError::validation(format!("Malformed form data: {e}")))
}

/// Drain a file field, returning its client-side file name and bytes.
pub(crate) async fn field_bytes(field: Field<'_>) -> Result<(String, Bytes), PlatformError> {
    let name = field.file_name().unwrap_or("upload").to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| PlatformError::validation(format!("Malformed form data: {e}")))?;
    Ok((name, bytes))
}

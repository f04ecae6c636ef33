use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::store::StoreError;
use crate::uploads::UploadError;
use crate::utils::response::error as error_response;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Malformed JSON body: {message}")]
    MalformedJson { message: String, preview: String },

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("External service error")]
    ExternalServiceError(#[from] UploadError),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => AppError::Conflict("Event already exists".to_string()),
            StoreError::NotFound => AppError::InternalServerError(
                "store reported a missing event on an unkeyed call".to_string(),
            ),
            StoreError::Failure(detail) => AppError::StoreError(detail),
        }
    }
}

impl AppError {
    /// Maps a store error for a keyed call so not-found echoes `event_id`.
    pub fn from_store(err: StoreError, event_id: &str) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound(event_id.to_string()),
            StoreError::Conflict => AppError::Conflict(format!("Event {} already exists", event_id)),
            other => other.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::MalformedJson { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ExternalServiceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::MalformedJson { .. } => "MALFORMED_JSON",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::StoreError(_) => "STORE_ERROR",
            AppError::ExternalServiceError(_) => "EXTERNAL_SERVICE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::ValidationError(e) => {
                warn!(code = self.code(), field = e.field(), message = %e, "Request rejected");
            }
            AppError::MalformedJson { message, .. } => {
                warn!(code = self.code(), message = %message, "Request rejected");
            }
            AppError::NotFound(id) => {
                warn!(code = self.code(), event_id = %id, "Event not found");
            }
            AppError::Conflict(msg) => {
                warn!(code = self.code(), message = %msg, "Request conflicted");
            }
            AppError::StoreError(detail) | AppError::InternalServerError(detail) => {
                error!(code = self.code(), error = ?self, detail = %detail, "Application error");
            }
            AppError::ExternalServiceError(e) => {
                error!(code = self.code(), error = ?e, detail = %e, "Upload authorizer error");
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level message to the client
        let (public_message, details) = match &self {
            AppError::ValidationError(e) => (e.to_string(), Some(e.details())),
            AppError::MalformedJson { message, preview } => (
                format!("Invalid JSON body: {}", message),
                Some(json!({ "preview": preview })),
            ),
            AppError::NotFound(id) => (
                format!("Event {} not found", id),
                Some(json!({ "eventId": id })),
            ),
            AppError::Conflict(msg) => (msg.clone(), None),
            AppError::StoreError(_) => ("A storage error occurred".to_string(), None),
            AppError::ExternalServiceError(_) => {
                ("Could not authorize the upload".to_string(), None)
            }
            AppError::InternalServerError(_) => ("Internal server error".to_string(), None),
        };

        error_response(code, public_message, details, status)
    }
}

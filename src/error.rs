use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;
use serde::Serialize;
use thiserror::Error;

use crate::utils::DATE_FORMAT;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    ValidatorError(#[from] validator::ValidationErrors),
}

/// Wire-format error body shared by both services.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: String,
    pub reason: String,
    pub message: String,
    pub timestamp: String,
}

impl ApiError {
    fn new(status: &str, reason: &str, message: String) -> Self {
        Self {
            status: status.to_string(),
            reason: reason.to_string(),
            message,
            timestamp: Local::now().format(DATE_FORMAT).to_string(),
        }
    }
}

impl AppError {
    /// (HTTP status, status name, reason) for the response body.
    fn status_parts(&self) -> (StatusCode, &'static str, &'static str) {
        match self {
            AppError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "The required object was not found.",
            ),
            AppError::Conflict(_) => (
                StatusCode::CONFLICT,
                "CONFLICT",
                "For the requested operation the conditions are not met.",
            ),
            AppError::Validation(_) | AppError::ValidatorError(_) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                "Incorrectly made request.",
            ),
            AppError::Database(sqlx::Error::Database(e)) if e.is_unique_violation() => (
                StatusCode::CONFLICT,
                "CONFLICT",
                "Integrity constraint has been violated.",
            ),
            AppError::Database(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => (
                StatusCode::CONFLICT,
                "CONFLICT",
                "Integrity constraint has been violated.",
            ),
            AppError::Database(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "Unexpected error.",
            ),
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::NotFound(msg) | AppError::Conflict(msg) | AppError::Validation(msg) => {
                msg.clone()
            }
            AppError::ValidatorError(errors) => first_field_error(errors),
            AppError::Database(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                constraint_message(e.constraint())
            }
            AppError::Database(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                "Related entities exist".to_string()
            }
            // internal details are logged, never exposed
            AppError::Database(_) | AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

/// Reports the first offending field, its message and the rejected value.
fn first_field_error(errors: &validator::ValidationErrors) -> String {
    for (field, field_errors) in errors.field_errors() {
        if let Some(e) = field_errors.first() {
            let message = e
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("violates constraint '{}'", e.code));
            let value = e
                .params
                .get("value")
                .map(|v| v.to_string())
                .unwrap_or_else(|| "null".to_string());
            return format!("Field: {}. Error: {}. Value: {}", field, message, value);
        }
    }
    "Validation failed".to_string()
}

fn constraint_message(constraint: Option<&str>) -> String {
    match constraint {
        Some(name) if name.contains("email") => "Email already exists".to_string(),
        Some(name) if name.contains("category") => "Category name already exists".to_string(),
        _ => "Data integrity violation".to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, status_name, reason) = self.status_parts();

        match &self {
            AppError::Database(e) if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Database error: {}", e);
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
            }
            other => {
                tracing::debug!("Request failed: {}", other);
            }
        }

        let body = ApiError::new(status_name, reason, self.client_message());
        (status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn not_found(msg: &str) -> Self {
        Self::NotFound(msg.to_string())
    }

    pub fn conflict(msg: &str) -> Self {
        Self::Conflict(msg.to_string())
    }

    pub fn validation(msg: &str) -> Self {
        Self::Validation(msg.to_string())
    }

    pub fn internal(msg: &str) -> Self {
        Self::Internal(msg.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let (status, name, _) = AppError::not_found("Event with id=7 was not found").status_parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(name, "NOT_FOUND");
    }

    #[test]
    fn conflict_maps_to_409() {
        let (status, _, reason) = AppError::conflict("limit reached").status_parts();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(reason, "For the requested operation the conditions are not met.");
    }

    #[test]
    fn validation_maps_to_400() {
        let (status, _, _) = AppError::validation("bad date").status_parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_message_is_not_exposed() {
        let err = AppError::internal("secret detail");
        assert_eq!(err.client_message(), "Internal server error");
    }
}

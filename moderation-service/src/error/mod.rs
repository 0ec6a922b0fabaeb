use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModerationError>;

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Referential conflict: {0}")]
    ReferentialConflict(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ResponseError for ModerationError {
    fn status_code(&self) -> StatusCode {
        match self {
            ModerationError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ModerationError::Validation(_) => StatusCode::BAD_REQUEST,
            ModerationError::NotFound(_) => StatusCode::NOT_FOUND,
            ModerationError::Conflict(_) => StatusCode::CONFLICT,
            ModerationError::ReferentialConflict(_) => StatusCode::CONFLICT,
            ModerationError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            ModerationError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ModerationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_type = match self {
            ModerationError::Database(_) => "DATABASE_ERROR",
            ModerationError::Validation(_) => "VALIDATION_ERROR",
            ModerationError::NotFound(_) => "NOT_FOUND",
            ModerationError::Conflict(_) => "CONFLICT",
            ModerationError::ReferentialConflict(_) => "REFERENTIAL_CONFLICT",
            ModerationError::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            ModerationError::Config(_) => "CONFIG_ERROR",
            ModerationError::Internal(_) => "INTERNAL_ERROR",
        };

        let message = self.to_string();
        let details = match self {
            ModerationError::Database(e) => Some(e.to_string()),
            _ => None,
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        HttpResponse::build(status_code).json(error_response)
    }
}

impl From<validator::ValidationErrors> for ModerationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ModerationError::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(
            ModerationError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ModerationError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ModerationError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ModerationError::ReferentialConflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ModerationError::ExternalService("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}

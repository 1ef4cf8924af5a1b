//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Policy denied: {0}")]
    PolicyDenied(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// HTTP status and stable machine-readable category.
    pub fn status_and_category(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            AppError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::PolicyDenied(_) => (StatusCode::FORBIDDEN, "policy_denied"),
            AppError::RateLimited(_) => (StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
            AppError::UpstreamUnreachable(_) => (StatusCode::BAD_GATEWAY, "upstream_unreachable"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, category) = self.status_and_category();
        let message = match &self {
            AppError::Internal(detail) => {
                error!(detail = %detail, "internal error");
                "Internal server error"
            }
            AppError::Unauthenticated(m)
            | AppError::InvalidToken(m)
            | AppError::Forbidden(m)
            | AppError::Validation(m)
            | AppError::Conflict(m)
            | AppError::NotFound(m)
            | AppError::PolicyDenied(m)
            | AppError::RateLimited(m)
            | AppError::UpstreamUnreachable(m) => m.as_str(),
        };
        let body = Json(ErrorResponse {
            error: category.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".into()),
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl From<minepanel_core::auth::AuthError> for AppError {
    fn from(e: minepanel_core::auth::AuthError) -> Self {
        use minepanel_core::auth::AuthError;
        match e {
            AuthError::CredentialError => AppError::Unauthenticated("Invalid credentials".into()),
            AuthError::InvalidToken => AppError::InvalidToken("Invalid or expired token".into()),
            AuthError::UserGone => AppError::InvalidToken("User no longer exists".into()),
            AuthError::Validation(msg) => AppError::Validation(msg),
            AuthError::Conflict(msg) => AppError::Conflict(msg),
            AuthError::NotFound(msg) => AppError::NotFound(msg),
            AuthError::DbError(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<minepanel_core::audit::AuditError> for AppError {
    fn from(e: minepanel_core::audit::AuditError) -> Self {
        AppError::Internal(e.to_string())
    }
}

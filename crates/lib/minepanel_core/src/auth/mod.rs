//! Authentication and authorization logic.
//!
//! Provides the role hierarchy, password hashing, the credential issuer and
//! identity queries shared by `minepanel_api` and the server binary.

pub mod jwt;
pub mod password;
pub mod queries;
pub mod role;

use thiserror::Error;

pub use role::Role;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    /// Signature, payload or expiry failure. Deliberately carries no detail.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("User no longer exists")]
    UserGone,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

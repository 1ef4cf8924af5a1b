//! Audit trail.
//!
//! One immutable record per sensitive action attempt. Records are only ever
//! appended; the schema rejects updates and deletes.

pub mod queries;

use std::fmt;

use thiserror::Error;

/// Actor name recorded when no identity is bound to the request.
pub const ANONYMOUS_ACTOR: &str = "anonymous";

/// Actor role recorded when no identity is bound to the request.
pub const UNKNOWN_ROLE: &str = "UNKNOWN";

/// Default page size for audit listings.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Hard cap on page size.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Audit errors.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Details serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Kinds of audited actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditAction {
    Login,
    LoginFailed,
    ListUsers,
    CreateUser,
    UpdateUser,
    DeleteUser,
    ViewInventory,
    ViewEnderchest,
    WhitelistAdd,
    WhitelistRemove,
    CommandExec,
    CommandDenied,
}

impl AuditAction {
    /// Stable tag stored in `audit_logs.action`.
    pub const fn as_str(self) -> &'static str {
        match self {
            AuditAction::Login => "LOGIN",
            AuditAction::LoginFailed => "LOGIN_FAILED",
            AuditAction::ListUsers => "LIST_USERS",
            AuditAction::CreateUser => "CREATE_USER",
            AuditAction::UpdateUser => "UPDATE_USER",
            AuditAction::DeleteUser => "DELETE_USER",
            AuditAction::ViewInventory => "VIEW_INVENTORY",
            AuditAction::ViewEnderchest => "VIEW_ENDERCHEST",
            AuditAction::WhitelistAdd => "WHITELIST_ADD",
            AuditAction::WhitelistRemove => "WHITELIST_REMOVE",
            AuditAction::CommandExec => "COMMAND_EXEC",
            AuditAction::CommandDenied => "COMMAND_DENIED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamped page request. Out-of-range values are pulled into bounds, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Clamp raw values: `page >= 1`, `1 <= limit <= 100`.
    /// Missing values fall back to page 1 / limit 50.
    pub fn clamped(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Rows to skip. Saturates instead of overflowing on absurd page numbers.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::clamped(None, None)
    }
}

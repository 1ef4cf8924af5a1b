//! API request and response models (camelCase on the wire).

use minepanel_core::auth::Role;
use minepanel_core::models::audit::{AuditPage, AuditRecord};
use minepanel_core::models::auth::{Identity, TokenPair, User};
use serde::{Deserialize, Serialize};

use crate::extract::Validate;

/// Error body returned for every failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Generic acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
    pub message: String,
}

/// `GET /health` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub version: String,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), String> {
        check_len("username", &self.username, 1, 50)?;
        check_len("password", &self.password, 1, 200)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl Validate for RefreshRequest {
    fn validate(&self) -> Result<(), String> {
        if self.refresh_token.is_empty() {
            return Err("Missing refresh token".into());
        }
        Ok(())
    }
}

/// Public view of an identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl From<&Identity> for AuthUser {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username.clone(),
            role: identity.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
    pub user: AuthUser,
}

impl TokenResponse {
    pub fn new(pair: TokenPair, identity: &Identity) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: pair.expires_in,
            token_type: "Bearer".to_string(),
            user: AuthUser::from(identity),
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), String> {
        check_len("username", &self.username, 3, 30)?;
        check_word_chars("username", &self.username)?;
        check_len("password", &self.password, 6, 200)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub password: Option<String>,
}

impl UpdateUserRequest {
    /// Names of the fields present in the request.
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.role.is_some() {
            fields.push("role");
        }
        if self.password.is_some() {
            fields.push("password");
        }
        fields
    }
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), String> {
        if let Some(password) = &self.password {
            check_len("password", password, 6, 200)?;
        }
        if self.role.is_none() && self.password.is_none() {
            return Err("No fields to update".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

/// Raw query parameters; parsed leniently and clamped by the handler.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: i64,
    pub actor_username: String,
    pub actor_role: String,
    pub ip: String,
    pub action: String,
    pub target: Option<String>,
    pub details_json: Option<String>,
    pub created_at: String,
}

impl From<AuditRecord> for AuditEntry {
    fn from(r: AuditRecord) -> Self {
        Self {
            id: r.id,
            actor_username: r.actor_username,
            actor_role: r.actor_role,
            ip: r.ip,
            action: r.action,
            target: r.target,
            details_json: r.details_json,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditListResponse {
    pub data: Vec<AuditEntry>,
    pub pagination: Pagination,
}

impl From<AuditPage> for AuditListResponse {
    fn from(page: AuditPage) -> Self {
        let pagination = Pagination {
            page: page.page,
            limit: page.limit,
            total: page.total,
            total_pages: page.total_pages(),
        };
        Self {
            data: page.records.into_iter().map(AuditEntry::from).collect(),
            pagination,
        }
    }
}

// ---------------------------------------------------------------------------
// Minecraft proxy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhitelistRequest {
    pub name: String,
}

impl Validate for WhitelistRequest {
    fn validate(&self) -> Result<(), String> {
        check_len("name", &self.name, 3, 16).map_err(|_| "Invalid player name".to_string())?;
        check_word_chars("name", &self.name).map_err(|_| "Invalid player name".to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Validate for CommandRequest {
    fn validate(&self) -> Result<(), String> {
        check_len("command", &self.command, 1, 50)?;
        if self.args.iter().any(|arg| arg.chars().count() > 500) {
            return Err("args entries must be at most 500 characters".into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn check_len(field: &str, value: &str, min: usize, max: usize) -> Result<(), String> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(format!("{field} must be {min}-{max} characters"));
    }
    Ok(())
}

fn check_word_chars(field: &str, value: &str) -> Result<(), String> {
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("{field} may only contain letters, digits and underscores"));
    }
    Ok(())
}

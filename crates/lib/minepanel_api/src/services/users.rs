//! User management service: identity lifecycle for administrators.

use minepanel_core::auth::{AuthError, Role, password, queries};
use minepanel_core::models::auth::{Identity, User, UserUpdate};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{CreateUserRequest, UpdateUserRequest};

/// List all users, newest first.
pub async fn list(pool: &SqlitePool) -> AppResult<Vec<User>> {
    Ok(queries::list_users(pool).await?)
}

/// Create a user. Duplicate usernames are a `Conflict`.
pub async fn create(pool: &SqlitePool, req: &CreateUserRequest) -> AppResult<User> {
    if queries::username_exists(pool, &req.username).await? {
        return Err(AppError::Conflict("Username already exists".into()));
    }
    let hash = password::hash_password(&req.password)?;
    Ok(queries::create_user(pool, &req.username, &hash, req.role).await?)
}

/// Update role and/or password.
pub async fn update(pool: &SqlitePool, user_id: i64, req: &UpdateUserRequest) -> AppResult<User> {
    let update = UserUpdate {
        role: req.role,
        password_hash: req
            .password
            .as_deref()
            .map(password::hash_password)
            .transpose()?,
    };
    if update.is_empty() {
        return Err(AppError::Validation("No fields to update".into()));
    }
    queries::update_user(pool, user_id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Delete a user, returning the deleted username. An actor can never delete
/// their own account.
pub async fn delete(pool: &SqlitePool, actor: &Identity, user_id: i64) -> AppResult<String> {
    if actor.id == user_id {
        return Err(AppError::Validation("Cannot delete yourself".into()));
    }
    queries::delete_user(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Parse a `{id}` path segment.
pub fn parse_user_id(raw: &str) -> AppResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| AppError::Validation("Invalid user ID".into()))
}

/// Outcome of [`seed_admin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    Created(User),
    AlreadyExists,
}

/// Create the initial administrator if `username` is not taken yet.
pub async fn seed_admin(pool: &SqlitePool, username: &str, password: &str) -> AppResult<SeedOutcome> {
    if queries::username_exists(pool, username).await? {
        info!(username, "admin user already exists, skipping seed");
        return Ok(SeedOutcome::AlreadyExists);
    }
    let hash = password::hash_password(password)?;
    match queries::create_user(pool, username, &hash, Role::Admin).await {
        Ok(user) => {
            info!(username, "created default admin user");
            warn!("change the default admin password immediately");
            Ok(SeedOutcome::Created(user))
        }
        Err(AuthError::Conflict(_)) => Ok(SeedOutcome::AlreadyExists),
        Err(e) => Err(e.into()),
    }
}

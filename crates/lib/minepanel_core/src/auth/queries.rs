//! Identity store queries.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::{AuthError, Role};
use crate::models::auth::{User, UserUpdate, UserWithPassword};

type UserRow = (i64, String, String, DateTime<Utc>);

fn user_from_row((id, username, role, created_at): UserRow) -> Result<User, AuthError> {
    let role = role
        .parse::<Role>()
        .map_err(|_| AuthError::Internal(format!("user {id} has unknown role {role}")))?;
    Ok(User {
        id,
        username,
        role,
        created_at,
    })
}

/// Map a UNIQUE violation on `users.username` to `Conflict`.
fn conflict_on_unique(e: sqlx::Error, username: &str) -> AuthError {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => {
            AuthError::Conflict(format!("Username already exists: {username}"))
        }
        _ => AuthError::DbError(e),
    }
}

/// Fetch a user and their password hash by username.
pub async fn find_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<UserWithPassword>, AuthError> {
    let row = sqlx::query_as::<_, (i64, String, String, DateTime<Utc>, String)>(
        "SELECT id, username, role, created_at, password_hash FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    row.map(|(id, username, role, created_at, password_hash)| {
        Ok(UserWithPassword {
            user: user_from_row((id, username, role, created_at))?,
            password_hash,
        })
    })
    .transpose()
}

/// Fetch a user by ID.
pub async fn get_user_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, role, created_at FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    row.map(user_from_row).transpose()
}

/// List all users, newest first.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>, AuthError> {
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, role, created_at FROM users ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(user_from_row).collect()
}

/// Check whether a username is already taken.
pub async fn username_exists(pool: &SqlitePool, username: &str) -> Result<bool, AuthError> {
    let exists =
        sqlx::query_scalar::<_, i64>("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
            .bind(username)
            .fetch_one(pool)
            .await?;
    Ok(exists != 0)
}

/// Create a new user.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    role: Role,
) -> Result<User, AuthError> {
    let now = Utc::now();
    let row = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (username, password_hash, role, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?) \
         RETURNING id, username, role, created_at",
    )
    .bind(username)
    .bind(password_hash)
    .bind(role.as_str())
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_unique(e, username))?;
    user_from_row(row)
}

/// Apply a partial update. Returns `None` if the user does not exist.
pub async fn update_user(
    pool: &SqlitePool,
    user_id: i64,
    update: &UserUpdate,
) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(
        "UPDATE users \
         SET role = COALESCE(?, role), \
             password_hash = COALESCE(?, password_hash), \
             updated_at = ? \
         WHERE id = ? \
         RETURNING id, username, role, created_at",
    )
    .bind(update.role.map(Role::as_str))
    .bind(update.password_hash.as_deref())
    .bind(Utc::now())
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    row.map(user_from_row).transpose()
}

/// Delete a user, returning the deleted username, or `None` if absent.
pub async fn delete_user(pool: &SqlitePool, user_id: i64) -> Result<Option<String>, AuthError> {
    let username = sqlx::query_scalar::<_, String>(
        "DELETE FROM users WHERE id = ? RETURNING username",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(username)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_ephemeral;

    async fn pool() -> SqlitePool {
        let pool = connect_ephemeral().await.unwrap();
        crate::migrate::migrate(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn create_and_fetch() {
        let pool = pool().await;
        let user = create_user(&pool, "alex", "hash", Role::Mod).await.unwrap();
        assert_eq!(user.role, Role::Mod);

        let found = find_user_by_username(&pool, "alex").await.unwrap().unwrap();
        assert_eq!(found.user.id, user.id);
        assert_eq!(found.password_hash, "hash");

        let by_id = get_user_by_id(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alex");
        assert!(username_exists(&pool, "alex").await.unwrap());
        assert!(!username_exists(&pool, "notch").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_username_is_conflict() {
        let pool = pool().await;
        create_user(&pool, "alex", "hash", Role::Viewer).await.unwrap();
        let err = create_user(&pool, "alex", "hash", Role::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict(_)));
    }

    #[tokio::test]
    async fn partial_update_keeps_untouched_fields() {
        let pool = pool().await;
        let user = create_user(&pool, "alex", "old-hash", Role::Viewer)
            .await
            .unwrap();

        let update = UserUpdate {
            role: Some(Role::Admin),
            password_hash: None,
        };
        let updated = update_user(&pool, user.id, &update).await.unwrap().unwrap();
        assert_eq!(updated.role, Role::Admin);

        let stored = find_user_by_username(&pool, "alex").await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "old-hash");

        assert!(update_user(&pool, 9999, &update).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_returns_username_once() {
        let pool = pool().await;
        let user = create_user(&pool, "alex", "hash", Role::Viewer)
            .await
            .unwrap();
        assert_eq!(
            delete_user(&pool, user.id).await.unwrap().as_deref(),
            Some("alex")
        );
        assert!(delete_user(&pool, user.id).await.unwrap().is_none());
        assert!(get_user_by_id(&pool, user.id).await.unwrap().is_none());
    }
}

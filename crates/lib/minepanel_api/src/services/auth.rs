//! Authentication service: login/refresh/logout flows delegating to `minepanel_core::auth`.

use minepanel_core::auth::jwt::TokenIssuer;
use minepanel_core::auth::{AuthError, password, queries};
use minepanel_core::models::auth::Identity;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{OkResponse, TokenResponse};

/// Authenticate with username + password.
///
/// Unknown usernames and wrong passwords fail identically.
pub async fn login(
    pool: &SqlitePool,
    issuer: &TokenIssuer,
    username: &str,
    password: &str,
) -> AppResult<(Identity, TokenResponse)> {
    let Some(found) = queries::find_user_by_username(pool, username).await? else {
        debug!(username, "login for unknown user");
        return Err(AuthError::CredentialError.into());
    };

    if !password::verify_password(password, &found.password_hash)? {
        debug!(username, "login with wrong password");
        return Err(AuthError::CredentialError.into());
    }

    let identity = found.user.identity();
    let pair = issuer.issue(&identity)?;
    let response = TokenResponse::new(pair, &identity);
    Ok((identity, response))
}

/// Exchange a refresh token for a new pair built from the user's current record.
///
/// The identity inside the refresh token is only used to find the user; a
/// role change since issue is reflected in the new pair, and a deleted user
/// gets `UserGone`.
pub async fn refresh(
    pool: &SqlitePool,
    issuer: &TokenIssuer,
    refresh_token: &str,
) -> AppResult<TokenResponse> {
    let claimed = issuer.verify_refresh(refresh_token)?;

    let user = queries::get_user_by_id(pool, claimed.id)
        .await?
        .ok_or(AuthError::UserGone)?;

    let identity = user.identity();
    let pair = issuer.issue(&identity)?;
    Ok(TokenResponse::new(pair, &identity))
}

/// Logout. Tokens are stateless, so this only acknowledges.
/// Clients discard their tokens; nothing is revoked server-side.
pub fn logout() -> OkResponse {
    OkResponse {
        ok: true,
        message: "Logged out. Discard your tokens.".into(),
    }
}

/// `true` for the credential failure that should be audited as a failed login.
pub fn is_credential_failure(err: &AppError) -> bool {
    matches!(err, AppError::Unauthenticated(_))
}

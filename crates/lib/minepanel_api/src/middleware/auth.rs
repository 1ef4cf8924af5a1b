//! Access gate: Bearer token authentication and minimum-role authorization.
//!
//! Routes compose the two steps in order: `require_auth` binds the verified
//! identity into request extensions, then `require_role` (parameterized by
//! a minimum role) checks it. A denied request never reaches the handler.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum::http::header::AUTHORIZATION;
use minepanel_core::auth::Role;
use minepanel_core::models::auth::Identity;
use tracing::debug;

use crate::AppState;
use crate::error::AppError;

/// Identity bound to the request by `require_auth`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

/// Axum middleware: extracts `Authorization: Bearer <token>`, verifies it as
/// an access token, and injects `AuthenticatedUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthenticated("Missing authorization header".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthenticated("Invalid authorization scheme".into()))?;

    let identity = state.issuer.verify_access(token)?;

    request.extensions_mut().insert(AuthenticatedUser(identity));

    Ok(next.run(request).await)
}

/// Axum middleware: rejects requests whose bound identity is below the
/// minimum role carried in the middleware state.
///
/// ```ignore
/// router.route_layer(axum::middleware::from_fn_with_state(Role::Admin, require_role))
/// ```
pub async fn require_role(
    State(min_role): State<Role>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthenticated("Not authenticated".into()))?;

    if !user.0.role.meets_min(min_role) {
        debug!(
            username = %user.0.username,
            role = %user.0.role,
            required = %min_role,
            path = %request.uri().path(),
            "insufficient role"
        );
        return Err(AppError::Forbidden("Insufficient permissions".into()));
    }

    Ok(next.run(request).await)
}

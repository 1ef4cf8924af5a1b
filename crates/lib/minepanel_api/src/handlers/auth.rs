//! Authentication request handlers.

use axum::Json;
use axum::extract::State;
use minepanel_core::audit::AuditAction;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::{ClientIp, Validated};
use crate::models::{LoginRequest, OkResponse, RefreshRequest, TokenResponse};
use crate::services::audit::AuditEvent;
use crate::services::auth;

/// `POST /auth/login`: authenticate with username + password.
///
/// Success is audited as `LOGIN`; bad credentials as `LOGIN_FAILED` with an
/// anonymous actor and the submitted username as target.
pub async fn login_handler(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Validated(body): Validated<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    match auth::login(&state.pool, &state.issuer, &body.username, &body.password).await {
        Ok((identity, resp)) => {
            state
                .audit
                .record(
                    Some(&identity),
                    &ip,
                    AuditEvent::new(AuditAction::Login).target(&identity.username),
                )
                .await;
            Ok(Json(resp))
        }
        Err(e) => {
            if auth::is_credential_failure(&e) {
                state
                    .audit
                    .record(
                        None,
                        &ip,
                        AuditEvent::new(AuditAction::LoginFailed).target(&body.username),
                    )
                    .await;
            }
            Err(e)
        }
    }
}

/// `POST /auth/refresh`: exchange a refresh token for a new token pair.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Validated(body): Validated<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    let resp = auth::refresh(&state.pool, &state.issuer, &body.refresh_token).await?;
    Ok(Json(resp))
}

/// `POST /auth/logout`: stateless acknowledgement.
pub async fn logout_handler() -> Json<OkResponse> {
    Json(auth::logout())
}

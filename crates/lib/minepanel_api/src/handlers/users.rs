//! User administration handlers (ADMIN only).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use minepanel_core::audit::AuditAction;
use serde_json::json;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::{ClientIp, Validated};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CreateUserRequest, OkResponse, UpdateUserRequest, UserResponse};
use crate::services::audit::AuditEvent;
use crate::services::users;

/// `GET /users`: list all users.
pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    ClientIp(ip): ClientIp,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = users::list(&state.pool).await?;
    state
        .audit
        .record(Some(&actor), &ip, AuditEvent::new(AuditAction::ListUsers))
        .await;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// `POST /users`: create a user with the given role.
pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    ClientIp(ip): ClientIp,
    Validated(body): Validated<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = users::create(&state.pool, &body).await?;
    state
        .audit
        .record(
            Some(&actor),
            &ip,
            AuditEvent::new(AuditAction::CreateUser)
                .target(&user.username)
                .details(json!({ "role": user.role })),
        )
        .await;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `PATCH /users/{id}`: change role and/or password.
pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    ClientIp(ip): ClientIp,
    Path(id): Path<String>,
    Validated(body): Validated<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let user_id = users::parse_user_id(&id)?;
    let user = users::update(&state.pool, user_id, &body).await?;
    state
        .audit
        .record(
            Some(&actor),
            &ip,
            AuditEvent::new(AuditAction::UpdateUser)
                .target(&user.username)
                .details(json!({ "fields": body.fields() })),
        )
        .await;
    Ok(Json(user.into()))
}

/// `DELETE /users/{id}`: delete a user other than the caller.
pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    ClientIp(ip): ClientIp,
    Path(id): Path<String>,
) -> AppResult<Json<OkResponse>> {
    let user_id = users::parse_user_id(&id)?;
    let username = users::delete(&state.pool, &actor, user_id).await?;
    state
        .audit
        .record(
            Some(&actor),
            &ip,
            AuditEvent::new(AuditAction::DeleteUser).target(&username),
        )
        .await;
    Ok(Json(OkResponse {
        ok: true,
        message: format!("User {username} deleted"),
    }))
}

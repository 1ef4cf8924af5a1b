//! Minecraft plugin proxy handlers.
//!
//! Every call is forwarded to the plugin with the caller's username as actor.
//! Sensitive reads and all mutations are audited before forwarding, so the
//! trail reflects attempts rather than confirmed downstream success.

use axum::Extension;
use axum::extract::{Path, State};
use minepanel_core::audit::AuditAction;
use minepanel_core::policy;
use serde_json::json;
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::extract::{ClientIp, Validated};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CommandRequest, WhitelistRequest};
use crate::routes::plugin;
use crate::services::audit::AuditEvent;
use crate::services::plugin::PluginResponse;

/// `GET /mc/health`
pub async fn health_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
) -> AppResult<PluginResponse> {
    state.plugin.get(plugin::HEALTH, &actor.username).await
}

/// `GET /mc/players`
pub async fn players_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
) -> AppResult<PluginResponse> {
    state.plugin.get(plugin::PLAYERS, &actor.username).await
}

/// `GET /mc/player/{uuid}`
pub async fn player_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(uuid): Path<String>,
) -> AppResult<PluginResponse> {
    check_uuid(&uuid)?;
    state.plugin.get(&plugin::player(&uuid), &actor.username).await
}

/// `GET /mc/player/{uuid}/inventory` (MOD)
pub async fn inventory_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    ClientIp(ip): ClientIp,
    Path(uuid): Path<String>,
) -> AppResult<PluginResponse> {
    check_uuid(&uuid)?;
    state
        .audit
        .record(
            Some(&actor),
            &ip,
            AuditEvent::new(AuditAction::ViewInventory).target(&uuid),
        )
        .await;
    state
        .plugin
        .get(&plugin::inventory(&uuid), &actor.username)
        .await
}

/// `GET /mc/player/{uuid}/enderchest` (MOD)
pub async fn enderchest_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    ClientIp(ip): ClientIp,
    Path(uuid): Path<String>,
) -> AppResult<PluginResponse> {
    check_uuid(&uuid)?;
    state
        .audit
        .record(
            Some(&actor),
            &ip,
            AuditEvent::new(AuditAction::ViewEnderchest).target(&uuid),
        )
        .await;
    state
        .plugin
        .get(&plugin::enderchest(&uuid), &actor.username)
        .await
}

/// `GET /mc/whitelist`
pub async fn whitelist_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
) -> AppResult<PluginResponse> {
    state.plugin.get(plugin::WHITELIST, &actor.username).await
}

/// `POST /mc/whitelist/add` (MOD)
pub async fn whitelist_add_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    ClientIp(ip): ClientIp,
    Validated(body): Validated<WhitelistRequest>,
) -> AppResult<PluginResponse> {
    state
        .audit
        .record(
            Some(&actor),
            &ip,
            AuditEvent::new(AuditAction::WhitelistAdd).target(&body.name),
        )
        .await;
    state
        .plugin
        .post(plugin::WHITELIST_ADD, &body, &actor.username)
        .await
}

/// `POST /mc/whitelist/remove` (MOD)
pub async fn whitelist_remove_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    ClientIp(ip): ClientIp,
    Validated(body): Validated<WhitelistRequest>,
) -> AppResult<PluginResponse> {
    state
        .audit
        .record(
            Some(&actor),
            &ip,
            AuditEvent::new(AuditAction::WhitelistRemove).target(&body.name),
        )
        .await;
    state
        .plugin
        .post(plugin::WHITELIST_REMOVE, &body, &actor.username)
        .await
}

/// `POST /mc/command` (MOD)
///
/// The command line is checked against the allowlist before anything is
/// forwarded. A denied command is audited and rejected; it never reaches
/// the plugin.
pub async fn command_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    ClientIp(ip): ClientIp,
    Validated(body): Validated<CommandRequest>,
) -> AppResult<PluginResponse> {
    let full = policy::full_command(&body.command, &body.args);

    if !policy::is_allowed(&full) {
        info!(actor = %actor.username, command = %full, "command denied by policy");
        state
            .audit
            .record(
                Some(&actor),
                &ip,
                AuditEvent::new(AuditAction::CommandDenied).details(json!({ "command": full })),
            )
            .await;
        return Err(AppError::PolicyDenied(format!(
            "Command not allowed: {}",
            body.command
        )));
    }

    state
        .audit
        .record(
            Some(&actor),
            &ip,
            AuditEvent::new(AuditAction::CommandExec).details(json!({ "command": full })),
        )
        .await;
    state
        .plugin
        .post(plugin::COMMAND, &body, &actor.username)
        .await
}

/// Player UUIDs are interpolated into the plugin path, so only hex digits
/// and dashes are accepted.
fn check_uuid(uuid: &str) -> AppResult<()> {
    let well_formed = (1..=36).contains(&uuid.len())
        && uuid.chars().all(|c| c.is_ascii_hexdigit() || c == '-');
    if !well_formed {
        return Err(AppError::Validation("Invalid UUID format".into()));
    }
    Ok(())
}

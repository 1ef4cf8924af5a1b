//! # minepanel_api
//!
//! HTTP API library for MinePanel.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, patch, post};
use minepanel_core::auth::Role;
use minepanel_core::auth::jwt::TokenIssuer;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ApiConfig;
use crate::error::AppResult;
use crate::handlers::{audit, auth, health, mc, users};
use crate::middleware::auth::{require_auth, require_role};
use crate::middleware::rate_limit::{RateLimiter, limit_login};
use crate::services::audit::AuditRecorder;
use crate::services::plugin::PluginClient;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool (identities and audit trail).
    pub pool: SqlitePool,
    /// API configuration.
    pub config: ApiConfig,
    /// Signs and verifies access/refresh tokens.
    pub issuer: TokenIssuer,
    /// Client for the game-server plugin.
    pub plugin: PluginClient,
    /// Best-effort audit writer.
    pub audit: AuditRecorder,
    /// Per-address login attempt counter.
    pub login_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Build the state from a migrated pool and validated configuration.
    pub fn new(pool: SqlitePool, config: ApiConfig) -> AppResult<Self> {
        let issuer = TokenIssuer::new(
            config.jwt_secret.as_bytes(),
            config.refresh_secret.as_bytes(),
        )?;
        let plugin = PluginClient::new(
            &config.plugin_base_url,
            &config.plugin_shared_secret,
            config.plugin_timeout,
        )?;
        let login_limiter = Arc::new(RateLimiter::new(
            config.login_rate_limit_max,
            config.login_rate_limit_window,
        ));
        Ok(Self {
            audit: AuditRecorder::new(pool.clone()),
            pool,
            config,
            issuer,
            plugin,
            login_limiter,
        })
    }
}

/// Run embedded database migrations.
///
/// Delegates to `minepanel_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    minepanel_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
///
/// Protected routes run `require_auth` first, then the group's
/// `require_role` gate, then the handler.
pub fn router(state: AppState) -> Router {
    // Public routes (no auth required)
    let login = Router::new()
        .route(routes::POST_AUTH_LOGIN, post(auth::login_handler))
        .route_layer(from_fn_with_state(state.login_limiter.clone(), limit_login));

    let public = Router::new()
        .route(routes::GET_HEALTH, get(health::health_handler))
        .route(routes::POST_AUTH_REFRESH, post(auth::refresh_handler))
        .route(routes::POST_AUTH_LOGOUT, post(auth::logout_handler))
        .merge(login);

    let viewer = Router::new()
        .route(routes::GET_MC_HEALTH, get(mc::health_handler))
        .route(routes::GET_MC_PLAYERS, get(mc::players_handler))
        .route(routes::GET_MC_PLAYER_UUID, get(mc::player_handler))
        .route(routes::GET_MC_WHITELIST, get(mc::whitelist_handler))
        .route_layer(from_fn_with_state(Role::Viewer, require_role));

    let moderator = Router::new()
        .route(routes::GET_MC_PLAYER_UUID_INVENTORY, get(mc::inventory_handler))
        .route(routes::GET_MC_PLAYER_UUID_ENDERCHEST, get(mc::enderchest_handler))
        .route(routes::POST_MC_WHITELIST_ADD, post(mc::whitelist_add_handler))
        .route(routes::POST_MC_WHITELIST_REMOVE, post(mc::whitelist_remove_handler))
        .route(routes::POST_MC_COMMAND, post(mc::command_handler))
        .route_layer(from_fn_with_state(Role::Mod, require_role));

    let admin = Router::new()
        .route(
            routes::USERS,
            get(users::list_users_handler).post(users::create_user_handler),
        )
        .route(
            routes::USERS_ID,
            patch(users::update_user_handler).delete(users::delete_user_handler),
        )
        .route(routes::GET_AUDIT, get(audit::list_audit_handler))
        .route_layer(from_fn_with_state(Role::Admin, require_role));

    // Protected routes (require auth)
    let protected = Router::new()
        .merge(viewer)
        .merge(moderator)
        .merge(admin)
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let cors = cors_layer(&state.config.cors_origin);

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the single configured panel origin, with credentials.
fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);
    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!(origin, "invalid CORS origin; cross-origin requests disabled");
            layer
        }
    }
}

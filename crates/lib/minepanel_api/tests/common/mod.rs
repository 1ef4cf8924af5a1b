//! Shared integration-test harness: in-memory store, seeded accounts and a
//! throwaway HTTP server standing in for the game-server plugin.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use axum::response::IntoResponse;
use minepanel_api::{AppState, config::ApiConfig};
use minepanel_core::audit::PageRequest;
use minepanel_core::auth::{Role, password, queries};
use minepanel_core::models::auth::Identity;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const PASSWORD: &str = "password1";
pub const PLUGIN_SECRET: &str = "plugin-secret";
pub const NIL_UUID: &str = "00000000-0000-0000-0000-000000000000";

/// One request observed by the fake plugin.
#[derive(Debug, Clone)]
pub struct PluginHit {
    pub method: Method,
    pub path: String,
    pub secret: Option<String>,
    pub actor: Option<String>,
    pub body: Value,
}

pub type Hits = Arc<Mutex<Vec<PluginHit>>>;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub hits: Hits,
    pub admin: Identity,
    pub moderator: Identity,
    pub viewer: Identity,
}

impl TestApp {
    /// App wired to a running fake plugin.
    pub async fn spawn() -> Self {
        let (base_url, hits) = spawn_fake_plugin().await;
        Self::with_plugin_url(&base_url, hits).await
    }

    /// App whose plugin URL points at a port nothing listens on.
    pub async fn without_plugin() -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);
        Self::with_plugin_url(&format!("http://127.0.0.1:{port}"), Hits::default()).await
    }

    async fn with_plugin_url(base_url: &str, hits: Hits) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("minepanel_api=debug")
            .try_init();

        let pool = minepanel_core::db::connect_ephemeral()
            .await
            .expect("ephemeral pool");
        minepanel_api::migrate(&pool).await.expect("migrate");

        let hash = password::hash_password(PASSWORD).expect("hash");
        let mut seeded = Vec::new();
        for (name, role) in [
            ("admin", Role::Admin),
            ("moderator", Role::Mod),
            ("viewer", Role::Viewer),
        ] {
            let user = queries::create_user(&pool, name, &hash, role)
                .await
                .expect("seed user");
            seeded.push(user.identity());
        }
        let [admin, moderator, viewer]: [Identity; 3] =
            seeded.try_into().expect("three seeded users");

        let state = AppState::new(pool, config(base_url)).expect("state");
        let router = minepanel_api::router(state.clone());

        Self {
            router,
            state,
            hits,
            admin,
            moderator,
            viewer,
        }
    }

    /// Access token for `identity`, minted without a login round trip.
    pub fn token(&self, identity: &Identity) -> String {
        self.state
            .issuer
            .issue(identity)
            .expect("issue")
            .access_token
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.expect("request");
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).expect("parse JSON")
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::POST, uri, token, Some(body))).await
    }

    /// Recorded audit actions, newest first.
    pub async fn audit_actions(&self) -> Vec<String> {
        self.audit_records()
            .await
            .into_iter()
            .map(|r| r.action)
            .collect()
    }

    pub async fn audit_records(&self) -> Vec<minepanel_core::models::audit::AuditRecord> {
        minepanel_core::audit::queries::list_audit_records(
            &self.state.pool,
            PageRequest::clamped(Some(1), Some(100)),
        )
        .await
        .expect("list audit")
        .records
    }

    pub fn plugin_hits(&self) -> Vec<PluginHit> {
        self.hits.lock().expect("hits lock").clone()
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

fn config(plugin_base_url: &str) -> ApiConfig {
    ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        database_url: "sqlite::memory:".into(),
        jwt_secret: "test-access-secret".into(),
        refresh_secret: "test-refresh-secret".into(),
        plugin_base_url: plugin_base_url.into(),
        plugin_shared_secret: PLUGIN_SECRET.into(),
        plugin_timeout: Duration::from_secs(2),
        cors_origin: "http://localhost:3000".into(),
        login_rate_limit_max: 10,
        login_rate_limit_window: Duration::from_secs(900),
    }
}

/// Start a plugin stand-in that records every request and echoes its path.
/// The nil player UUID answers 404 so status relaying can be observed.
async fn spawn_fake_plugin() -> (String, Hits) {
    let hits = Hits::default();
    let app = Router::new().fallback(record_hit).with_state(hits.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake plugin");
    let addr = listener.local_addr().expect("fake plugin addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), hits)
}

async fn record_hit(
    State(hits): State<Hits>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    let path = uri.path().to_string();
    hits.lock().expect("hits lock").push(PluginHit {
        method,
        path: path.clone(),
        secret: header("x-panel-secret"),
        actor: header("x-panel-actor"),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    if path == format!("/api/player/{NIL_UUID}") {
        return (StatusCode::NOT_FOUND, axum::Json(json!({"error": "Player not found"})));
    }
    (StatusCode::OK, axum::Json(json!({"ok": true, "path": path})))
}

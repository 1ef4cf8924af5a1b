//! Plugin proxy client.
//!
//! Only the backend knows the plugin's shared secret. Calls are bounded by a
//! timeout; the plugin's status and JSON body are relayed verbatim, and any
//! transport failure becomes `UpstreamUnreachable`.

use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::warn;

use crate::error::{AppError, AppResult};

/// Header carrying the shared secret.
pub const SECRET_HEADER: &str = "X-Panel-Secret";

/// Header naming the panel user on whose behalf the call is made.
pub const ACTOR_HEADER: &str = "X-Panel-Actor";

/// Message returned when the plugin cannot be reached.
const UNREACHABLE: &str = "Plugin unreachable";

/// Relayed plugin response.
#[derive(Debug, Clone)]
pub struct PluginResponse {
    pub status: StatusCode,
    pub body: serde_json::Value,
}

impl IntoResponse for PluginResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// HTTP client for the game-server plugin.
#[derive(Clone, Debug)]
pub struct PluginClient {
    http: reqwest::Client,
    base_url: String,
    shared_secret: String,
}

impl PluginClient {
    pub fn new(base_url: &str, shared_secret: &str, timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("plugin client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            shared_secret: shared_secret.to_string(),
        })
    }

    /// `GET {base}{path}` on behalf of `actor`.
    pub async fn get(&self, path: &str, actor: &str) -> AppResult<PluginResponse> {
        let url = self.url(path);
        let request = self.http.get(&url);
        self.send(request, &url, actor).await
    }

    /// `POST {base}{path}` with a JSON body on behalf of `actor`.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        actor: &str,
    ) -> AppResult<PluginResponse> {
        let url = self.url(path);
        let request = self.http.post(&url).json(body);
        self.send(request, &url, actor).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
        actor: &str,
    ) -> AppResult<PluginResponse> {
        let response = request
            .header(SECRET_HEADER, &self.shared_secret)
            .header(ACTOR_HEADER, actor)
            .send()
            .await
            .map_err(|e| unreachable(url, &e))?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);

        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| unreachable(url, &e))?;

        Ok(PluginResponse { status, body })
    }
}

fn unreachable(url: &str, e: &reqwest::Error) -> AppError {
    warn!(url, timeout = e.is_timeout(), "plugin call failed: {e}");
    AppError::UpstreamUnreachable(UNREACHABLE.into())
}

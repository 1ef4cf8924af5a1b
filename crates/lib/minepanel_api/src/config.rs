//! API server configuration.

use std::time::Duration;

use minepanel_core::auth::jwt::resolve_secret;
use minepanel_core::db::DEFAULT_DATABASE_URL;
use thiserror::Error;

/// Configuration errors detected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    EmptySecret(&'static str),

    #[error("JWT_SECRET and REFRESH_SECRET must differ")]
    SharedSecret,

    #[error("Invalid plugin URL {url}: {reason}")]
    PluginUrl { url: String, reason: String },

    #[error("Invalid CORS origin: {0}")]
    CorsOrigin(String),
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:4000").
    pub bind_addr: String,
    /// SQLite connection URL.
    pub database_url: String,
    /// Access token signing secret.
    pub jwt_secret: String,
    /// Refresh token signing secret. Must differ from `jwt_secret`.
    pub refresh_secret: String,
    /// Base URL of the game-server plugin API.
    pub plugin_base_url: String,
    /// Shared secret sent to the plugin in `X-Panel-Secret`.
    pub plugin_shared_secret: String,
    /// Per-call timeout for plugin requests.
    pub plugin_timeout: Duration,
    /// Browser origin allowed by CORS.
    pub cors_origin: String,
    /// Login attempts allowed per source per window.
    pub login_rate_limit_max: u32,
    /// Login rate-limit window.
    pub login_rate_limit_window: Duration,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                       | Default                            |
    /// |--------------------------------|------------------------------------|
    /// | `BIND_ADDR`                    | `127.0.0.1:4000`                   |
    /// | `DATABASE_URL`                 | `sqlite://minepanel.db?mode=rwc`   |
    /// | `JWT_SECRET`                   | generated & persisted to file      |
    /// | `REFRESH_SECRET`               | generated & persisted to file      |
    /// | `PLUGIN_BASE_URL`              | `http://127.0.0.1:8765`            |
    /// | `PLUGIN_SHARED_SECRET`         | empty                              |
    /// | `PLUGIN_TIMEOUT_SECS`          | `10`                               |
    /// | `CORS_ORIGIN`                  | `http://localhost:3000`            |
    /// | `LOGIN_RATE_LIMIT_MAX`         | `10`                               |
    /// | `LOGIN_RATE_LIMIT_WINDOW_SECS` | `900`                              |
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or("BIND_ADDR", "127.0.0.1:4000"),
            database_url: env_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            jwt_secret: resolve_secret("JWT_SECRET", "jwt-secret"),
            refresh_secret: resolve_secret("REFRESH_SECRET", "refresh-secret"),
            plugin_base_url: env_or("PLUGIN_BASE_URL", "http://127.0.0.1:8765"),
            plugin_shared_secret: env_or("PLUGIN_SHARED_SECRET", ""),
            plugin_timeout: Duration::from_secs(env_parse("PLUGIN_TIMEOUT_SECS", 10)),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:3000"),
            login_rate_limit_max: env_parse("LOGIN_RATE_LIMIT_MAX", 10),
            login_rate_limit_window: Duration::from_secs(env_parse(
                "LOGIN_RATE_LIMIT_WINDOW_SECS",
                15 * 60,
            )),
        }
    }

    /// Reject configurations that would weaken token isolation or break the proxy.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::EmptySecret("JWT_SECRET"));
        }
        if self.refresh_secret.is_empty() {
            return Err(ConfigError::EmptySecret("REFRESH_SECRET"));
        }
        if self.jwt_secret == self.refresh_secret {
            return Err(ConfigError::SharedSecret);
        }
        let url = url::Url::parse(&self.plugin_base_url).map_err(|e| ConfigError::PluginUrl {
            url: self.plugin_base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::PluginUrl {
                url: self.plugin_base_url.clone(),
                reason: "scheme must be http or https".into(),
            });
        }
        if axum::http::HeaderValue::from_str(&self.cors_origin).is_err() {
            return Err(ConfigError::CorsOrigin(self.cors_origin.clone()));
        }
        Ok(())
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

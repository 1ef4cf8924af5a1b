//! Login rate limiting: fixed window per client address.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use tracing::warn;

use crate::error::AppError;
use crate::extract::peer_ip;

/// Fixed-window attempt counter keyed by client address.
#[derive(Debug)]
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    max_attempts: u32,
    window: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    attempts: u32,
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_attempts,
            window,
        }
    }

    /// Count an attempt for `key`; `false` once the window's budget is spent.
    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    fn allow_at(&self, key: &str, now: Instant) -> bool {
        if self.max_attempts == 0 {
            return true;
        }
        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            attempts: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                attempts: 0,
            };
        }
        if entry.attempts >= self.max_attempts {
            return false;
        }
        entry.attempts += 1;
        true
    }

    /// Drop windows that have fully elapsed. Returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.duration_since(w.started) < self.window);
        before - self.windows.len()
    }
}

/// Axum middleware: rejects the request with 429 once the caller's address
/// has used up its login attempts for the current window.
///
/// Keyed on the TCP peer address; `X-Forwarded-For` is client-controlled.
pub async fn limit_login(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = peer_ip(request.extensions());
    if !limiter.allow(&ip) {
        warn!(ip = %ip, "login rate limit exceeded");
        return Err(AppError::RateLimited(
            "Too many login attempts, try again later".into(),
        ));
    }
    Ok(next.run(request).await)
}

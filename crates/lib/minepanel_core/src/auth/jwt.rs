//! JWT token generation and verification.
//!
//! Tokens are stateless: validity is signature + expiry only. Access and
//! refresh tokens are signed with distinct secrets and tagged with their
//! kind, so neither is ever accepted in place of the other.

use std::path::PathBuf;

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{debug, info};

use super::AuthError;
use crate::models::auth::{Identity, TokenClaims, TokenKind, TokenPair};

/// Access token lifetime: 15 minutes.
pub const ACCESS_TOKEN_EXPIRY_SECS: i64 = 15 * 60;

/// Refresh token lifetime: 7 days.
pub const REFRESH_TOKEN_EXPIRY_SECS: i64 = 7 * 24 * 60 * 60;

/// Signs and verifies access/refresh tokens (HS256).
///
/// Built once at process start from configuration and handed to whatever
/// needs it; there is no global key material.
#[derive(Clone)]
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Create an issuer with the default lifetimes (15 min / 7 days).
    ///
    /// Fails if either secret is empty or both secrets are identical.
    pub fn new(access_secret: &[u8], refresh_secret: &[u8]) -> Result<Self, AuthError> {
        if access_secret.is_empty() || refresh_secret.is_empty() {
            return Err(AuthError::Internal("token secrets must not be empty".into()));
        }
        if access_secret == refresh_secret {
            return Err(AuthError::Internal(
                "access and refresh token secrets must differ".into(),
            ));
        }
        Ok(Self {
            access_encoding: EncodingKey::from_secret(access_secret),
            access_decoding: DecodingKey::from_secret(access_secret),
            refresh_encoding: EncodingKey::from_secret(refresh_secret),
            refresh_decoding: DecodingKey::from_secret(refresh_secret),
            access_ttl: Duration::seconds(ACCESS_TOKEN_EXPIRY_SECS),
            refresh_ttl: Duration::seconds(REFRESH_TOKEN_EXPIRY_SECS),
        })
    }

    /// Override token lifetimes. A negative lifetime yields already-expired tokens.
    pub fn with_ttls(mut self, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        self.access_ttl = access_ttl;
        self.refresh_ttl = refresh_ttl;
        self
    }

    /// Access token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Sign a fresh access + refresh pair for `identity`.
    pub fn issue(&self, identity: &Identity) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.sign(identity, TokenKind::Access)?,
            refresh_token: self.sign(identity, TokenKind::Refresh)?,
            expires_in: self.access_ttl_secs(),
        })
    }

    /// Verify an access token and return the identity snapshot it carries.
    pub fn verify_access(&self, token: &str) -> Result<Identity, AuthError> {
        self.verify(token, TokenKind::Access)
    }

    /// Verify a refresh token.
    ///
    /// The returned snapshot only identifies the user; callers must re-read
    /// the current record before re-issuing credentials.
    pub fn verify_refresh(&self, token: &str) -> Result<Identity, AuthError> {
        self.verify(token, TokenKind::Refresh)
    }

    fn sign(&self, identity: &Identity, kind: TokenKind) -> Result<String, AuthError> {
        let (key, ttl) = match kind {
            TokenKind::Access => (&self.access_encoding, self.access_ttl),
            TokenKind::Refresh => (&self.refresh_encoding, self.refresh_ttl),
        };
        let now = Utc::now();
        let claims = TokenClaims {
            sub: identity.id,
            username: identity.username.clone(),
            role: identity.role,
            typ: kind,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, key)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    fn verify(&self, token: &str, kind: TokenKind) -> Result<Identity, AuthError> {
        let key = match kind {
            TokenKind::Access => &self.access_decoding,
            TokenKind::Refresh => &self.refresh_decoding,
        };
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        let claims = decode::<TokenClaims>(token, key, &validation)
            .map_err(|e| {
                debug!(?kind, error = %e, "token rejected");
                AuthError::InvalidToken
            })?
            .claims;

        if claims.typ != kind {
            debug!(?kind, actual = ?claims.typ, "token kind mismatch");
            return Err(AuthError::InvalidToken);
        }
        Ok(claims.identity())
    }
}

/// Resolve a signing secret: env var `env_var` → persisted file `file_name`
/// in the data directory → freshly generated (and persisted).
pub fn resolve_secret(env_var: &str, file_name: &str) -> String {
    if let Ok(secret) = std::env::var(env_var)
        && !secret.is_empty()
    {
        return secret;
    }
    let secret_path = secret_path(file_name);
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = secret_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = std::fs::write(&secret_path, &secret);
    info!(path = %secret_path.display(), env_var, "generated new signing secret");
    secret
}

/// Path to a persisted secret file.
fn secret_path(file_name: &str) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("minepanel")
        .join(file_name)
}

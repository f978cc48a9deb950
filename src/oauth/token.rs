use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use super::AuthError;

/// Seconds of remaining validity below which a cached token is not reused.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Access token as persisted in the token cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub scopes: Vec<String>,
    /// Unix timestamp (seconds) after which the access token is no longer valid.
    pub expires_at: i64,
}

impl Token {
    pub fn is_fresh(&self, now: i64) -> bool {
        self.expires_at - now > EXPIRY_MARGIN_SECS
    }

    pub fn covers<S: AsRef<str>>(&self, requested: &[S]) -> bool {
        requested
            .iter()
            .all(|scope| self.scopes.iter().any(|s| s == scope.as_ref()))
    }
}

/// Body of a successful `/api/token` response.
#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub scope: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    /// `previous_refresh_token` is kept when the provider does not rotate it.
    pub fn into_token(self, now: i64, previous_refresh_token: Option<String>) -> Token {
        let scopes = self
            .scope
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        Token {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh_token),
            scopes,
            expires_at: now + self.expires_in,
        }
    }
}

/// Reads a cached token; an unreadable cache is treated as absent.
pub fn load_cached_token(path: &Path) -> Option<Token> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(token) => Some(token),
        Err(e) => {
            warn!("Ignoring malformed token cache {:?}: {}", path, e);
            None
        }
    }
}

pub fn save_token(path: &Path, token: &Token) -> Result<(), AuthError> {
    let content =
        serde_json::to_string_pretty(token).map_err(|e| AuthError::Cache(e.to_string()))?;
    std::fs::write(path, content)
        .map_err(|e| AuthError::Cache(format!("Failed to write {:?}: {}", path, e)))
}

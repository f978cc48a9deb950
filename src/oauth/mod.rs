//! OAuth authorization-code flow against the Spotify accounts service.
//!
//! This module handles:
//! - Authorization URL generation with a random CSRF state
//! - Parsing the redirected URL the user pastes back
//! - Token exchange (authorization code for tokens) and refresh
//! - Token caching, so later runs skip the browser step

mod token;

pub use token::Token;

use chrono::Utc;
use rand::{distr::Alphanumeric, Rng};
use reqwest::blocking::Client;
use reqwest::Url;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use token::TokenResponse;

pub const SPOTIFY_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

/// Permissions requested for every session.
pub const SCOPES: [&str; 4] = [
    "user-library-read",
    "user-library-modify",
    "playlist-modify-private",
    "playlist-read-private",
];

/// Seconds an authorization state stays valid while the user completes consent.
const AUTH_STATE_TTL_SECS: i64 = 300;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Authorization was denied: {0}")]
    ConsentDenied(String),

    #[error("CSRF state mismatch")]
    StateMismatch,

    #[error("Authorization state expired")]
    StateExpired,

    #[error("Redirect URL carries no authorization code")]
    MissingCode,

    #[error("Invalid redirect URL: {0}")]
    InvalidRedirect(String),

    #[error("Token exchange failed (status {status}): {message}")]
    TokenExchange { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Token cache error: {0}")]
    Cache(String),

    #[error("Could not read authorization response: {0}")]
    Prompt(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Http(e.to_string())
    }
}

/// Long-lived application credentials plus the account they act for.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub redirect_uri: String,
}

/// State kept between building the authorize URL and reading the redirect back.
#[derive(Debug, Clone)]
pub struct AuthState {
    pub csrf_token: String,
    pub created_at: i64,
}

/// An authenticated handle bound to one user and one scope set.
///
/// Created once at startup and held for the process lifetime.
#[derive(Debug, Clone)]
pub struct Session {
    username: String,
    token: Token,
}

impl Session {
    /// Wraps an already obtained access token.
    pub fn for_token(username: &str, access_token: &str) -> Self {
        Self {
            username: username.to_string(),
            token: Token {
                access_token: access_token.to_string(),
                refresh_token: None,
                scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
                expires_at: i64::MAX,
            },
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn access_token(&self) -> &str {
        &self.token.access_token
    }

    pub fn scopes(&self) -> &[String] {
        &self.token.scopes
    }
}

pub struct SpotifyOAuth {
    client: Client,
    credentials: Credentials,
    accounts_base_url: String,
    token_cache_path: PathBuf,
}

impl SpotifyOAuth {
    pub fn new(
        credentials: Credentials,
        accounts_base_url: &str,
        token_cache_path: PathBuf,
        timeout: Duration,
    ) -> Result<Self, AuthError> {
        for (name, value) in [
            ("client_id", &credentials.client_id),
            ("client_secret", &credentials.client_secret),
            ("username", &credentials.username),
            ("redirect_uri", &credentials.redirect_uri),
        ] {
            if value.trim().is_empty() {
                return Err(AuthError::MissingCredential(name));
            }
        }

        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            credentials,
            accounts_base_url: accounts_base_url.trim_end_matches('/').to_string(),
            token_cache_path,
        })
    }

    /// Returns a session, reusing or refreshing a cached token when possible and
    /// falling back to the interactive consent flow.
    ///
    /// `prompt` receives the authorize URL and must return the URL the browser
    /// was redirected to.
    pub fn login<F>(&self, prompt: F) -> Result<Session, AuthError>
    where
        F: FnOnce(&str) -> std::io::Result<String>,
    {
        let now = Utc::now().timestamp();

        if let Some(cached) = token::load_cached_token(&self.token_cache_path) {
            if !cached.covers(&SCOPES) {
                info!("Cached token does not cover the requested scopes, re-authorizing");
            } else if cached.is_fresh(now) {
                info!("Using cached access token");
                return Ok(self.session(cached));
            } else if let Some(refresh_token) = cached.refresh_token.as_deref() {
                info!("Cached access token expired, refreshing");
                let token = self.refresh(refresh_token)?;
                token::save_token(&self.token_cache_path, &token)?;
                return Ok(self.session(token));
            }
        }

        let (url, state) = self.authorize_url()?;
        let redirected = prompt(&url).map_err(|e| AuthError::Prompt(e.to_string()))?;
        let code = self.parse_redirect(&redirected, &state)?;
        let token = self.exchange_code(&code)?;
        token::save_token(&self.token_cache_path, &token)?;
        info!("Authorized as {}", self.credentials.username);
        Ok(self.session(token))
    }

    /// Generate the URL the user must open to grant consent.
    pub fn authorize_url(&self) -> Result<(String, AuthState), AuthError> {
        let csrf_token: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        let url = Url::parse_with_params(
            &format!("{}/authorize", self.accounts_base_url),
            &[
                ("client_id", self.credentials.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
                ("scope", SCOPES.join(" ").as_str()),
                ("state", csrf_token.as_str()),
            ],
        )
        .map_err(|e| AuthError::InvalidRedirect(e.to_string()))?;

        debug!("Generated authorization URL with state: {}", csrf_token);

        Ok((
            url.to_string(),
            AuthState {
                csrf_token,
                created_at: Utc::now().timestamp(),
            },
        ))
    }

    /// Validate the redirected URL against `stored_state` and extract the code.
    pub fn parse_redirect(
        &self,
        redirected_url: &str,
        stored_state: &AuthState,
    ) -> Result<String, AuthError> {
        let url = Url::parse(redirected_url.trim())
            .map_err(|e| AuthError::InvalidRedirect(e.to_string()))?;

        let param = |name: &str| {
            url.query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
        };

        if let Some(error) = param("error") {
            return Err(AuthError::ConsentDenied(error));
        }

        if param("state").as_deref() != Some(stored_state.csrf_token.as_str()) {
            return Err(AuthError::StateMismatch);
        }

        if Utc::now().timestamp() - stored_state.created_at > AUTH_STATE_TTL_SECS {
            return Err(AuthError::StateExpired);
        }

        param("code").ok_or(AuthError::MissingCode)
    }

    /// Exchange an authorization code for tokens.
    pub fn exchange_code(&self, code: &str) -> Result<Token, AuthError> {
        let response = self.request_token(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.credentials.redirect_uri.as_str()),
        ])?;
        Ok(response.into_token(Utc::now().timestamp(), None))
    }

    pub fn refresh(&self, refresh_token: &str) -> Result<Token, AuthError> {
        let response = self.request_token(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])?;
        Ok(response.into_token(Utc::now().timestamp(), Some(refresh_token.to_string())))
    }

    fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let url = format!("{}/api/token", self.accounts_base_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(form)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::TokenExchange {
                status: status.as_u16(),
                message: response.text().unwrap_or_default(),
            });
        }

        response
            .json()
            .map_err(|e| AuthError::Http(format!("Failed to parse token response: {}", e)))
    }

    fn session(&self, token: Token) -> Session {
        Session {
            username: self.credentials.username.clone(),
            token,
        }
    }
}

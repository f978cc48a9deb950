//! Blocking HTTP client for the Spotify Web API.

use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::SpotifyError;
use super::models::{Artist, AudioFeatures, AudioFeaturesResponse, CurrentUser, SavedTracksPage};
use super::trait_def::SpotifyApi;
use crate::oauth::Session;

pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

/// Web API client bound to one authenticated [`Session`].
pub struct SpotifyClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl SpotifyClient {
    pub fn new(base_url: &str, session: &Session, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: session.access_token().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /me`, the profile of the user the token belongs to.
    pub fn current_user(&self) -> Result<CurrentUser, SpotifyError> {
        self.get_json("/me", &[])
    }

    /// Warns when the token belongs to a different account than the configured one.
    pub fn verify_user(&self, expected_username: &str) -> Result<CurrentUser, SpotifyError> {
        let user = self.current_user()?;
        if user.id != expected_username {
            warn!(
                "Authenticated as '{}' but configured username is '{}'",
                user.id, expected_username
            );
        }
        Ok(user)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SpotifyError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, ?query, "GET");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()?;

        let response = check_status(response)?;
        response
            .json()
            .map_err(|e| SpotifyError::InvalidResponse(format!("{}: {}", path, e)))
    }
}

fn check_status(response: Response) -> Result<Response, SpotifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(SpotifyError::Unauthorized(
            response.text().unwrap_or_default(),
        )),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            Err(SpotifyError::RateLimited { retry_after_secs })
        }
        _ => Err(SpotifyError::Api {
            status: status.as_u16(),
            message: response.text().unwrap_or_default(),
        }),
    }
}

impl SpotifyApi for SpotifyClient {
    fn saved_tracks(&self, limit: usize, offset: usize) -> Result<SavedTracksPage, SpotifyError> {
        self.get_json(
            "/me/tracks",
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
    }

    fn artist(&self, artist_id: &str) -> Result<Artist, SpotifyError> {
        self.get_json(&format!("/artists/{}", artist_id), &[])
    }

    fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, SpotifyError> {
        let body: AudioFeaturesResponse =
            self.get_json("/audio-features", &[("ids", track_ids.join(","))])?;
        Ok(body.audio_features)
    }
}

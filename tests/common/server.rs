#![allow(dead_code)]

use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::{json, Value};
use std::time::Duration;

use super::constants::*;
use liked_songs_exporter::oauth::{Credentials, Session};
use liked_songs_exporter::spotify::SpotifyClient;

/// Local stand-in for both the accounts service and the Web API (under `/v1`).
pub struct MockSpotify {
    pub server: MockServer,
}

pub fn audio_features_json(track_id: &str, tempo: f64) -> Value {
    json!({
        "danceability": 0.61,
        "energy": 0.83,
        "key": 7,
        "loudness": -5.42,
        "mode": 1,
        "speechiness": 0.047,
        "acousticness": 0.0021,
        "instrumentalness": 0.000012,
        "liveness": 0.19,
        "valence": 0.54,
        "tempo": tempo,
        "type": "audio_features",
        "id": track_id,
        "uri": format!("spotify:track:{}", track_id),
        "track_href": format!("https://api.spotify.com/v1/tracks/{}", track_id),
        "analysis_url": format!("https://api.spotify.com/v1/audio-analysis/{}", track_id),
        "duration_ms": 201_573,
        "time_signature": 4
    })
}

fn saved_items() -> Vec<Value> {
    let alpha = json!({ "id": ARTIST_ALPHA_ID, "name": "Alpha" });
    let beta = json!({ "id": ARTIST_BETA_ID, "name": "Beta" });
    vec![
        json!({
            "added_at": "2024-01-04T08:00:00Z",
            "track": { "id": TRACK_INTRO_ID, "name": "Intro", "artists": [alpha] }
        }),
        json!({
            "added_at": "2024-01-03T08:00:00Z",
            "track": { "id": TRACK_DUET_ID, "name": "Duet", "artists": [alpha, beta] }
        }),
        json!({
            "added_at": "2024-01-02T08:00:00Z",
            "track": { "id": null, "name": "Voice memo", "artists": [{ "id": null, "name": "Me" }] }
        }),
        json!({
            "added_at": "2024-01-01T08:00:00Z",
            "track": { "id": TRACK_DEMO_ID, "name": "Demo", "artists": [beta] }
        }),
    ]
}

impl MockSpotify {
    pub fn start() -> Self {
        Self {
            server: MockServer::start(),
        }
    }

    pub fn api_base_url(&self) -> String {
        format!("{}/v1", self.server.base_url())
    }

    pub fn accounts_base_url(&self) -> String {
        self.server.base_url()
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            client_id: CLIENT_ID.to_string(),
            client_secret: CLIENT_SECRET.to_string(),
            username: USERNAME.to_string(),
            redirect_uri: REDIRECT_URI.to_string(),
        }
    }

    pub fn client(&self) -> SpotifyClient {
        SpotifyClient::new(
            &self.api_base_url(),
            &Session::for_token(USERNAME, ACCESS_TOKEN),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    /// Registers every endpoint the export touches, with the default library.
    pub fn serve_library(&self) {
        self.serve_saved_tracks();
        self.serve_artist(ARTIST_ALPHA_ID, &["pop", "rock"]);
        self.serve_artist(ARTIST_BETA_ID, &["pop", "jazz"]);
        self.serve_audio_features();
        self.serve_me(USERNAME);
    }

    /// The total probe and the single page of 50.
    pub fn serve_saved_tracks(&self) -> (Mock<'_>, Mock<'_>) {
        let items = saved_items();
        let probe = self.server.mock(|when, then| {
            when.method(GET)
                .path("/v1/me/tracks")
                .query_param("limit", "1")
                .query_param("offset", "0")
                .header("Authorization", format!("Bearer {}", ACCESS_TOKEN));
            then.status(200)
                .json_body(json!({ "total": SAVED_ITEM_COUNT, "items": [items[0].clone()] }));
        });
        let page = self.server.mock(|when, then| {
            when.method(GET)
                .path("/v1/me/tracks")
                .query_param("limit", "50")
                .query_param("offset", "0")
                .header("Authorization", format!("Bearer {}", ACCESS_TOKEN));
            then.status(200)
                .json_body(json!({ "total": SAVED_ITEM_COUNT, "items": items }));
        });
        (probe, page)
    }

    pub fn serve_artist(&self, artist_id: &str, genres: &[&str]) -> Mock<'_> {
        let path = format!("/v1/artists/{}", artist_id);
        let body = json!({ "id": artist_id, "name": artist_id, "genres": genres });
        self.server.mock(|when, then| {
            when.method(GET).path(path);
            then.status(200).json_body(body);
        })
    }

    pub fn serve_artist_rate_limited(&self, artist_id: &str) -> Mock<'_> {
        let path = format!("/v1/artists/{}", artist_id);
        self.server.mock(|when, then| {
            when.method(GET).path(path);
            then.status(429).header("Retry-After", "17");
        })
    }

    /// Returns features out of request order, with a null for the demo track.
    pub fn serve_audio_features(&self) -> Mock<'_> {
        let ids = [TRACK_INTRO_ID, TRACK_DUET_ID, TRACK_DEMO_ID].join(",");
        self.server.mock(|when, then| {
            when.method(GET)
                .path("/v1/audio-features")
                .query_param("ids", ids);
            then.status(200).json_body(json!({
                "audio_features": [
                    audio_features_json(TRACK_DUET_ID, 98.0),
                    null,
                    audio_features_json(TRACK_INTRO_ID, 124.0)
                ]
            }));
        })
    }

    pub fn serve_me(&self, user_id: &str) -> Mock<'_> {
        let body = json!({ "id": user_id, "display_name": "Test Listener" });
        self.server.mock(|when, then| {
            when.method(GET).path("/v1/me");
            then.status(200).json_body(body);
        })
    }

    pub fn serve_token_exchange(&self) -> Mock<'_> {
        self.server.mock(|when, then| {
            when.method(POST)
                .path("/api/token")
                .header_exists("Authorization")
                .body_contains("grant_type=authorization_code");
            then.status(200).json_body(json!({
                "access_token": ACCESS_TOKEN,
                "token_type": "Bearer",
                "scope": "user-library-read user-library-modify playlist-modify-private playlist-read-private",
                "expires_in": 3600,
                "refresh_token": REFRESH_TOKEN
            }));
        })
    }
}

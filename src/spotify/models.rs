//! Wire models for the Web API endpoints the exporter talks to.

use serde::{Deserialize, Serialize};

/// One page of `GET /me/tracks`.
#[derive(Debug, Clone, Deserialize)]
pub struct SavedTracksPage {
    pub total: usize,
    #[serde(default)]
    pub items: Vec<SavedTrackItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SavedTrackItem {
    pub added_at: String,
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    /// `None` for local uploads and some unavailable tracks.
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

/// Artist as embedded in a track object (no genres).
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistRef {
    pub id: Option<String>,
    pub name: String,
}

/// Full artist object from `GET /artists/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioFeaturesResponse {
    /// Entries are `null` for ids the upstream has no analysis for.
    #[serde(default)]
    pub audio_features: Vec<Option<AudioFeatures>>,
}

/// Audio descriptor vector of one track, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub id: String,
    pub danceability: f64,
    pub energy: f64,
    pub key: i64,
    pub loudness: f64,
    pub mode: i64,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub duration_ms: i64,
    pub time_signature: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub track_href: String,
    #[serde(default)]
    pub analysis_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: Option<String>,
}

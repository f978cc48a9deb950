//! In-memory [`SpotifyApi`] used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use super::error::SpotifyError;
use super::models::{Artist, ArtistRef, AudioFeatures, SavedTrackItem, SavedTracksPage, Track};
use super::trait_def::SpotifyApi;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SavedTracks { limit: usize, offset: usize },
    Artist(String),
    AudioFeatures(Vec<String>),
}

#[derive(Default)]
pub struct FakeSpotifyApi {
    pub saved: Vec<SavedTrackItem>,
    pub genres: HashMap<String, Vec<String>>,
    pub features: HashMap<String, AudioFeatures>,
    pub fail_artist: Option<String>,
    pub fail_features: bool,
    calls: Mutex<Vec<Call>>,
}

impl FakeSpotifyApi {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn saved_track_calls(&self) -> Vec<(usize, usize)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SavedTracks { limit, offset } => Some((limit, offset)),
                _ => None,
            })
            .collect()
    }

    pub fn artist_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Artist(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn feature_batches(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::AudioFeatures(ids) => Some(ids),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl SpotifyApi for FakeSpotifyApi {
    fn saved_tracks(&self, limit: usize, offset: usize) -> Result<SavedTracksPage, SpotifyError> {
        self.record(Call::SavedTracks { limit, offset });
        let start = offset.min(self.saved.len());
        let end = (offset + limit).min(self.saved.len());
        Ok(SavedTracksPage {
            total: self.saved.len(),
            items: self.saved[start..end].to_vec(),
        })
    }

    fn artist(&self, artist_id: &str) -> Result<Artist, SpotifyError> {
        self.record(Call::Artist(artist_id.to_string()));
        if self.fail_artist.as_deref() == Some(artist_id) {
            return Err(SpotifyError::Api {
                status: 500,
                message: "boom".to_string(),
            });
        }
        let genres = self.genres.get(artist_id).cloned().ok_or(SpotifyError::Api {
            status: 404,
            message: format!("no artist {}", artist_id),
        })?;
        Ok(Artist {
            id: artist_id.to_string(),
            name: artist_id.to_string(),
            genres,
        })
    }

    fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, SpotifyError> {
        self.record(Call::AudioFeatures(track_ids.to_vec()));
        if self.fail_features {
            return Err(SpotifyError::Timeout);
        }
        // Reversed so that callers relying on positional matching break.
        Ok(track_ids
            .iter()
            .rev()
            .map(|id| self.features.get(id).cloned())
            .collect())
    }
}

pub fn saved_item(track_id: &str, name: &str, artists: &[(&str, &str)]) -> SavedTrackItem {
    SavedTrackItem {
        added_at: format!("2023-01-01T00:00:00Z#{}", track_id),
        track: Some(Track {
            id: Some(track_id.to_string()),
            name: name.to_string(),
            artists: artists
                .iter()
                .map(|(id, name)| ArtistRef {
                    id: Some(id.to_string()),
                    name: name.to_string(),
                })
                .collect(),
        }),
    }
}

pub fn features_for(track_id: &str) -> AudioFeatures {
    AudioFeatures {
        id: track_id.to_string(),
        danceability: 0.5,
        energy: 0.7,
        key: 2,
        loudness: -6.5,
        mode: 1,
        speechiness: 0.05,
        acousticness: 0.12,
        instrumentalness: 0.0,
        liveness: 0.1,
        valence: 0.6,
        tempo: 121.0,
        duration_ms: 210_000,
        time_signature: 4,
        kind: "audio_features".to_string(),
        uri: format!("spotify:track:{}", track_id),
        track_href: format!("https://api.spotify.com/v1/tracks/{}", track_id),
        analysis_url: format!("https://api.spotify.com/v1/audio-analysis/{}", track_id),
    }
}

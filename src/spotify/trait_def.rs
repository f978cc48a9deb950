//! SpotifyApi trait definition.

use super::error::SpotifyError;
use super::models::{Artist, AudioFeatures, SavedTracksPage};

/// The slice of the upstream Web API used by the extraction stages.
///
/// Implemented by [`super::SpotifyClient`] for real runs and by in-memory fakes in tests.
pub trait SpotifyApi: Send + Sync {
    /// Fetch one page of the current user's saved tracks.
    fn saved_tracks(&self, limit: usize, offset: usize) -> Result<SavedTracksPage, SpotifyError>;

    /// Look up a single artist, including its genre tags.
    fn artist(&self, artist_id: &str) -> Result<Artist, SpotifyError>;

    /// Fetch audio features for a batch of track ids in one call.
    ///
    /// The result is not guaranteed to follow the order of `track_ids`, and holds
    /// `None` for ids without an analysis. Callers must match on `AudioFeatures::id`.
    fn audio_features(
        &self,
        track_ids: &[String],
    ) -> Result<Vec<Option<AudioFeatures>>, SpotifyError>;
}

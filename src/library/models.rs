use serde::{Deserialize, Serialize};

/// One row per saved ("liked") track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTrackRecord {
    pub added_at: String,
    pub track_id: String,
    pub track_name: String,
    /// Artist names, in upstream order.
    pub artists: Vec<String>,
    /// Artist ids, same order and length as `artists`.
    pub artist_ids: Vec<String>,
    /// Genre tags of every artist on the track, concatenated in artist order.
    /// Duplicates are preserved.
    pub artist_genres: Vec<String>,
}

/// Rows extracted from a single saved-tracks page, before genre resolution.
#[derive(Debug, Clone, Default)]
pub struct ExtractedPage {
    pub rows: Vec<SavedTrackRecord>,
    /// Items without a usable track or artist id.
    pub skipped: usize,
}

/// Result of a full library extraction.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutcome {
    pub tracks: Vec<SavedTrackRecord>,
    /// Total reported by the upstream when the scan started.
    pub reported_total: usize,
    pub pages_requested: usize,
    pub skipped_items: usize,
    /// Number of distinct artists looked up for genres.
    pub artist_lookups: usize,
}

use serde::{Deserialize, Serialize};

use crate::library::SavedTrackRecord;
use crate::spotify::AudioFeatures;

/// A saved track joined with its audio features (`track.track_id == features.id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTrack {
    #[serde(flatten)]
    pub track: SavedTrackRecord,
    #[serde(flatten)]
    pub features: AudioFeatures,
}

/// Inner join result: matched rows in track order, plus the ids that had no features.
#[derive(Debug, Clone, Default)]
pub struct JoinOutcome {
    pub table: Vec<EnrichedTrack>,
    pub unmatched_track_ids: Vec<String>,
}

mod enricher;
mod models;

pub use enricher::{
    batch_ranges, enrich_tracks, fetch_audio_features, join_features, MAX_FEATURE_BATCH,
};
pub use models::{EnrichedTrack, JoinOutcome};

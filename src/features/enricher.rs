//! Batched audio-feature lookup and the join onto saved tracks.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::ops::Range;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::models::{EnrichedTrack, JoinOutcome};
use crate::library::SavedTrackRecord;
use crate::spotify::{AudioFeatures, SpotifyApi};

/// Upstream ceiling for ids per audio-features request.
pub const MAX_FEATURE_BATCH: usize = 100;

const UNMATCHED_LOG_SAMPLE: usize = 5;

/// `[i*size, min((i+1)*size, n))` for every batch index; never yields an empty range.
pub fn batch_ranges(n: usize, size: usize) -> Vec<Range<usize>> {
    if size == 0 {
        return Vec::new();
    }
    (0..n.div_ceil(size))
        .map(|i| i * size..((i + 1) * size).min(n))
        .collect()
}

/// Request features for `track_ids`, one call per batch, and concatenate the results.
///
/// `null` entries returned for unknown ids are dropped. A failed batch aborts the fetch.
pub fn fetch_audio_features<A: SpotifyApi + ?Sized>(
    api: &A,
    track_ids: &[String],
    batch_size: usize,
) -> Result<Vec<AudioFeatures>> {
    if batch_size == 0 || batch_size > MAX_FEATURE_BATCH {
        bail!(
            "Feature batch size must be between 1 and {}, got {}",
            MAX_FEATURE_BATCH,
            batch_size
        );
    }

    let ranges = batch_ranges(track_ids.len(), batch_size);
    let mut features = Vec::with_capacity(track_ids.len());
    for (batch, range) in ranges.iter().enumerate() {
        let ids = &track_ids[range.clone()];
        let returned = api
            .audio_features(ids)
            .with_context(|| format!("Failed to fetch audio features for batch {}", batch))?;
        debug!(batch, requested = ids.len(), "Fetched audio features batch");
        features.extend(returned.into_iter().flatten());
    }
    Ok(features)
}

/// Inner join on `track_id == features.id`, keeping track order.
///
/// The first feature row seen for an id wins.
pub fn join_features(tracks: Vec<SavedTrackRecord>, features: Vec<AudioFeatures>) -> JoinOutcome {
    let mut by_id: HashMap<String, AudioFeatures> = HashMap::with_capacity(features.len());
    for f in features {
        by_id.entry(f.id.clone()).or_insert(f);
    }

    let mut outcome = JoinOutcome::default();
    for track in tracks {
        match by_id.get(&track.track_id) {
            Some(features) => outcome.table.push(EnrichedTrack {
                features: features.clone(),
                track,
            }),
            None => outcome.unmatched_track_ids.push(track.track_id),
        }
    }
    outcome
}

/// Fetch features for every track and join them on.
pub fn enrich_tracks<A: SpotifyApi + ?Sized>(
    api: &A,
    tracks: Vec<SavedTrackRecord>,
    batch_size: usize,
) -> Result<JoinOutcome> {
    let start = Instant::now();
    let track_ids: Vec<String> = tracks.iter().map(|t| t.track_id.clone()).collect();
    let features = fetch_audio_features(api, &track_ids, batch_size)?;
    let feature_rows = features.len();

    let outcome = join_features(tracks, features);
    if !outcome.unmatched_track_ids.is_empty() {
        let sample: Vec<&str> = outcome
            .unmatched_track_ids
            .iter()
            .take(UNMATCHED_LOG_SAMPLE)
            .map(String::as_str)
            .collect();
        warn!(
            "Dropped {} tracks without audio features (e.g. {})",
            outcome.unmatched_track_ids.len(),
            sample.join(", ")
        );
    }

    info!(
        "Enriched {} of {} tracks ({} feature rows) in {}ms",
        outcome.table.len(),
        track_ids.len(),
        feature_rows,
        start.elapsed().as_millis()
    );
    Ok(outcome)
}

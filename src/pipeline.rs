//! Runs the extraction stages in order and writes the dated snapshot.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use crate::features::enrich_tracks;
use crate::genres::{rank_genres, GenreFrequency};
use crate::library::extract_saved_tracks;
use crate::snapshot::{snapshot_path, write_snapshot};
use crate::spotify::SpotifyApi;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub page_limit: usize,
    pub feature_batch_size: usize,
    pub artist_lookup_workers: usize,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_date: NaiveDate,
    pub snapshot_path: PathBuf,
    pub reported_total: usize,
    pub pages_requested: usize,
    pub extracted_tracks: usize,
    pub skipped_items: usize,
    pub artist_lookups: usize,
    pub enriched_tracks: usize,
    pub unmatched_track_ids: Vec<String>,
    pub genre_frequencies: Vec<GenreFrequency>,
}

/// Extract, enrich and aggregate the saved tracks behind `api`.
///
/// The snapshot is only written once every upstream call has succeeded.
pub fn run<A: SpotifyApi + ?Sized>(
    api: &A,
    settings: &PipelineSettings,
    today: NaiveDate,
) -> Result<RunReport> {
    let start = Instant::now();

    let extraction = extract_saved_tracks(api, settings.page_limit, settings.artist_lookup_workers)
        .context("Library extraction failed")?;
    let extracted_tracks = extraction.tracks.len();

    let joined = enrich_tracks(api, extraction.tracks, settings.feature_batch_size)
        .context("Feature enrichment failed")?;

    let (_, genre_frequencies) = rank_genres(&joined.table);

    let path = snapshot_path(&settings.output_dir, today);
    write_snapshot(&path, &joined.table)?;

    info!(
        "Export finished in {}ms: {} tracks saved to {:?}",
        start.elapsed().as_millis(),
        joined.table.len(),
        path
    );

    Ok(RunReport {
        run_date: today,
        snapshot_path: path,
        reported_total: extraction.reported_total,
        pages_requested: extraction.pages_requested,
        extracted_tracks,
        skipped_items: extraction.skipped_items,
        artist_lookups: extraction.artist_lookups,
        enriched_tracks: joined.table.len(),
        unmatched_track_ids: joined.unmatched_track_ids,
        genre_frequencies,
    })
}

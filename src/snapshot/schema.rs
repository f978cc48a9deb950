//! SQLite schema of the snapshot artifact.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table};

/// One row per enriched track, in extraction order (`rowid`).
pub const ENRICHED_TRACKS_TABLE: Table = Table {
    name: "enriched_tracks",
    columns: &[
        sqlite_column!("added_at", &SqlType::Text, non_null = true),
        sqlite_column!("track_id", &SqlType::Text, non_null = true),
        sqlite_column!("track_name", &SqlType::Text, non_null = true),
        sqlite_column!("artists", &SqlType::Text, non_null = true), // JSON array
        sqlite_column!("artist_ids", &SqlType::Text, non_null = true), // JSON array
        sqlite_column!("artist_genres", &SqlType::Text, non_null = true), // JSON array
        // Audio features
        sqlite_column!("danceability", &SqlType::Real, non_null = true),
        sqlite_column!("energy", &SqlType::Real, non_null = true),
        sqlite_column!("key", &SqlType::Integer, non_null = true),
        sqlite_column!("loudness", &SqlType::Real, non_null = true),
        sqlite_column!("mode", &SqlType::Integer, non_null = true),
        sqlite_column!("speechiness", &SqlType::Real, non_null = true),
        sqlite_column!("acousticness", &SqlType::Real, non_null = true),
        sqlite_column!("instrumentalness", &SqlType::Real, non_null = true),
        sqlite_column!("liveness", &SqlType::Real, non_null = true),
        sqlite_column!("valence", &SqlType::Real, non_null = true),
        sqlite_column!("tempo", &SqlType::Real, non_null = true),
        sqlite_column!("type", &SqlType::Text, non_null = true),
        sqlite_column!("id", &SqlType::Text, non_null = true),
        sqlite_column!("uri", &SqlType::Text, non_null = true),
        sqlite_column!("track_href", &SqlType::Text, non_null = true),
        sqlite_column!("analysis_url", &SqlType::Text, non_null = true),
        sqlite_column!("duration_ms", &SqlType::Integer, non_null = true),
        sqlite_column!("time_signature", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_enriched_tracks_track_id", "track_id")],
};

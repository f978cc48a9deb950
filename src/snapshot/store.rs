//! Dated SQLite snapshot of the enriched track table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::schema::ENRICHED_TRACKS_TABLE;
use crate::features::EnrichedTrack;
use crate::library::SavedTrackRecord;
use crate::spotify::AudioFeatures;

/// `liked_songs_YYYY-MM-DD.db`
pub fn snapshot_file_name(date: NaiveDate) -> String {
    format!("liked_songs_{}.db", date.format("%Y-%m-%d"))
}

pub fn snapshot_path(output_dir: &Path, date: NaiveDate) -> PathBuf {
    output_dir.join(snapshot_file_name(date))
}

fn to_json(values: &[String]) -> Result<String> {
    serde_json::to_string(values).context("Failed to encode list column")
}

fn json_list(row: &Row, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Write `rows` to `path`, replacing any existing file.
///
/// The table is written to a sibling file first and moved into place once
/// committed, so a failed write never leaves a partial snapshot at `path`.
pub fn write_snapshot(path: &Path, rows: &[EnrichedTrack]) -> Result<()> {
    let partial = path.with_extension("db-partial");
    if partial.exists() {
        std::fs::remove_file(&partial)
            .with_context(|| format!("Failed to remove stale {:?}", partial))?;
    }

    let mut conn = Connection::open(&partial)
        .with_context(|| format!("Failed to create snapshot {:?}", partial))?;
    let tx = conn.transaction()?;
    ENRICHED_TRACKS_TABLE.create(&tx)?;
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {} ({}) VALUES ({})",
            ENRICHED_TRACKS_TABLE.name,
            ENRICHED_TRACKS_TABLE.column_list(),
            ENRICHED_TRACKS_TABLE.placeholders()
        ))?;
        for row in rows {
            let t = &row.track;
            let f = &row.features;
            stmt.execute(params![
                t.added_at,
                t.track_id,
                t.track_name,
                to_json(&t.artists)?,
                to_json(&t.artist_ids)?,
                to_json(&t.artist_genres)?,
                f.danceability,
                f.energy,
                f.key,
                f.loudness,
                f.mode,
                f.speechiness,
                f.acousticness,
                f.instrumentalness,
                f.liveness,
                f.valence,
                f.tempo,
                f.kind,
                f.id,
                f.uri,
                f.track_href,
                f.analysis_url,
                f.duration_ms,
                f.time_signature,
            ])
            .with_context(|| format!("Failed to insert track {}", t.track_id))?;
        }
    }
    tx.commit().context("Failed to commit snapshot")?;
    conn.close()
        .map_err(|(_, e)| e)
        .context("Failed to close snapshot")?;

    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to replace existing snapshot {:?}", path))?;
    }
    std::fs::rename(&partial, path)
        .with_context(|| format!("Failed to move snapshot into {:?}", path))?;
    info!("Wrote {} rows to snapshot {:?}", rows.len(), path);
    Ok(())
}

/// Load a snapshot written by [`write_snapshot`], checking its schema first.
pub fn read_snapshot(path: &Path) -> Result<Vec<EnrichedTrack>> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("Failed to open snapshot {:?}", path))?;
    ENRICHED_TRACKS_TABLE
        .validate(&conn)
        .with_context(|| format!("{:?} is not a liked songs snapshot", path))?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {} ORDER BY rowid",
        ENRICHED_TRACKS_TABLE.column_list(),
        ENRICHED_TRACKS_TABLE.name
    ))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(EnrichedTrack {
                track: SavedTrackRecord {
                    added_at: row.get(0)?,
                    track_id: row.get(1)?,
                    track_name: row.get(2)?,
                    artists: json_list(row, 3)?,
                    artist_ids: json_list(row, 4)?,
                    artist_genres: json_list(row, 5)?,
                },
                features: AudioFeatures {
                    danceability: row.get(6)?,
                    energy: row.get(7)?,
                    key: row.get(8)?,
                    loudness: row.get(9)?,
                    mode: row.get(10)?,
                    speechiness: row.get(11)?,
                    acousticness: row.get(12)?,
                    instrumentalness: row.get(13)?,
                    liveness: row.get(14)?,
                    valence: row.get(15)?,
                    tempo: row.get(16)?,
                    kind: row.get(17)?,
                    id: row.get(18)?,
                    uri: row.get(19)?,
                    track_href: row.get(20)?,
                    analysis_url: row.get(21)?,
                    duration_ms: row.get(22)?,
                    time_signature: row.get(23)?,
                },
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read rows from {:?}", path))?;

    debug!("Read {} rows from snapshot {:?}", rows.len(), path);
    Ok(rows)
}

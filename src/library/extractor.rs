//! Paginated extraction of the saved-tracks collection.

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::models::{ExtractedPage, ExtractionOutcome, SavedTrackRecord};
use crate::spotify::{SavedTrackItem, SpotifyApi};

/// Upstream ceiling for the saved-tracks page size.
pub const MAX_PAGE_LIMIT: usize = 50;

/// Number of page requests issued for a collection of `total` items.
///
/// Always one more than the number of full pages, so a `total` that is an exact
/// multiple of `limit` ends with a request at `offset == total` returning no items.
pub fn page_count(total: usize, limit: usize) -> usize {
    total / limit + 1
}

/// Extract every saved track, with genres resolved for each artist.
///
/// Any failed request aborts the whole extraction.
pub fn extract_saved_tracks<A: SpotifyApi + ?Sized>(
    api: &A,
    limit: usize,
    artist_lookup_workers: usize,
) -> Result<ExtractionOutcome> {
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        bail!("Page limit must be between 1 and {}, got {}", MAX_PAGE_LIMIT, limit);
    }

    let start = Instant::now();
    let reported_total = api
        .saved_tracks(1, 0)
        .context("Failed to read saved tracks total")?
        .total;
    let pages = page_count(reported_total, limit);
    info!(
        "Extracting {} saved tracks in {} pages of {}",
        reported_total, pages, limit
    );

    let extracted = (0..pages)
        .map(|page_index| extract_page(api, page_index, limit))
        .collect::<Result<Vec<_>>>()?;

    let skipped_items: usize = extracted.iter().map(|p| p.skipped).sum();
    let mut tracks: Vec<SavedTrackRecord> = extracted.into_iter().flat_map(|p| p.rows).collect();

    if skipped_items > 0 {
        warn!(
            "Skipped {} saved items without a track or artist id",
            skipped_items
        );
    }

    let artist_ids: Vec<&str> = tracks
        .iter()
        .flat_map(|t| t.artist_ids.iter().map(String::as_str))
        .collect();
    let genres = resolve_artist_genres(api, &artist_ids, artist_lookup_workers)?;
    let artist_lookups = genres.len();

    for track in &mut tracks {
        track.artist_genres = flatten_genres(&track.artist_ids, &genres);
    }

    info!(
        "Extracted {} tracks ({} distinct artists) in {}ms",
        tracks.len(),
        artist_lookups,
        start.elapsed().as_millis()
    );

    Ok(ExtractionOutcome {
        tracks,
        reported_total,
        pages_requested: pages,
        skipped_items,
        artist_lookups,
    })
}

/// Request the page at `page_index` and turn its items into rows.
///
/// `artist_genres` is left empty; it is filled once all pages are in.
pub fn extract_page<A: SpotifyApi + ?Sized>(
    api: &A,
    page_index: usize,
    limit: usize,
) -> Result<ExtractedPage> {
    let offset = page_index * limit;
    let page = api
        .saved_tracks(limit, offset)
        .with_context(|| format!("Failed to fetch saved tracks at offset {}", offset))?;
    debug!(offset, items = page.items.len(), "Fetched saved tracks page");

    let mut extracted = ExtractedPage::default();
    for item in page.items {
        match to_record(item) {
            Some(row) => extracted.rows.push(row),
            None => extracted.skipped += 1,
        }
    }
    Ok(extracted)
}

fn to_record(item: SavedTrackItem) -> Option<SavedTrackRecord> {
    let track = item.track?;
    let track_id = track.id?;

    let mut artists = Vec::with_capacity(track.artists.len());
    let mut artist_ids = Vec::with_capacity(track.artists.len());
    for artist in track.artists {
        artist_ids.push(artist.id?);
        artists.push(artist.name);
    }

    Some(SavedTrackRecord {
        added_at: item.added_at,
        track_id,
        track_name: track.name,
        artists,
        artist_ids,
        artist_genres: Vec::new(),
    })
}

/// Look up the genres of every distinct artist in `artist_ids` exactly once.
///
/// With more than one worker the lookups run on a bounded rayon pool.
pub fn resolve_artist_genres<A: SpotifyApi + ?Sized>(
    api: &A,
    artist_ids: &[&str],
    workers: usize,
) -> Result<HashMap<String, Vec<String>>> {
    let mut seen = HashSet::new();
    let unique: Vec<&str> = artist_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    debug!(
        "Resolving genres for {} distinct artists ({} references)",
        unique.len(),
        artist_ids.len()
    );

    let lookup = |id: &&str| -> Result<(String, Vec<String>)> {
        let artist = api
            .artist(id)
            .with_context(|| format!("Failed to look up artist {}", id))?;
        Ok((id.to_string(), artist.genres))
    };

    let resolved: Vec<(String, Vec<String>)> = if workers <= 1 {
        unique.iter().map(lookup).collect::<Result<_>>()?
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .context("Failed to build artist lookup pool")?;
        pool.install(|| unique.par_iter().map(lookup).collect::<Result<_>>())?
    };

    Ok(resolved.into_iter().collect())
}

/// Concatenate the genre lists of `artist_ids`, in artist order, keeping duplicates.
pub fn flatten_genres(artist_ids: &[String], genres: &HashMap<String, Vec<String>>) -> Vec<String> {
    artist_ids
        .iter()
        .filter_map(|id| genres.get(id))
        .flatten()
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::fake::{saved_item, FakeSpotifyApi};
    use crate::spotify::{ArtistRef, SavedTrackItem, Track};

    fn library_of(n: usize) -> FakeSpotifyApi {
        let mut api = FakeSpotifyApi::default();
        for i in 0..n {
            let artist = format!("a{}", i % 3);
            api.saved.push(saved_item(
                &format!("t{}", i),
                &format!("Track {}", i),
                &[(artist.as_str(), "Artist")],
            ));
        }
        api.genres.insert("a0".into(), vec!["pop".into()]);
        api.genres.insert("a1".into(), vec!["rock".into(), "indie".into()]);
        api.genres.insert("a2".into(), vec![]);
        api
    }

    #[test]
    fn test_page_count_quirk() {
        assert_eq!(page_count(0, 50), 1);
        assert_eq!(page_count(49, 50), 1);
        assert_eq!(page_count(50, 50), 2);
        assert_eq!(page_count(120, 50), 3);
        assert_eq!(page_count(150, 50), 4);
    }

    #[test]
    fn extracts_every_track_across_pages() {
        let api = library_of(120);
        let outcome = extract_saved_tracks(&api, 50, 1).unwrap();

        assert_eq!(outcome.tracks.len(), 120);
        assert_eq!(outcome.reported_total, 120);
        assert_eq!(outcome.pages_requested, 3);
        // One probe for the total, then one request per page.
        assert_eq!(
            api.saved_track_calls(),
            vec![(1, 0), (50, 0), (50, 50), (50, 100)]
        );
        for track in &outcome.tracks {
            assert_eq!(track.artists.len(), track.artist_ids.len());
        }
        assert_eq!(outcome.tracks[0].track_id, "t0");
        assert_eq!(outcome.tracks[119].track_id, "t119");
        assert_eq!(outcome.tracks[1].artist_genres, vec!["rock", "indie"]);
    }

    #[test]
    fn exact_multiple_requests_trailing_empty_page() {
        let api = library_of(100);
        let outcome = extract_saved_tracks(&api, 50, 1).unwrap();

        assert_eq!(outcome.tracks.len(), 100);
        let calls = api.saved_track_calls();
        assert_eq!(calls.len(), 1 + page_count(100, 50));
        assert_eq!(calls.last(), Some(&(50, 100)));
    }

    #[test]
    fn empty_library_requests_single_page() {
        let api = FakeSpotifyApi::default();
        let outcome = extract_saved_tracks(&api, 50, 1).unwrap();
        assert!(outcome.tracks.is_empty());
        assert_eq!(api.saved_track_calls(), vec![(1, 0), (50, 0)]);
        assert!(api.artist_calls().is_empty());
    }

    #[test]
    fn genres_flatten_in_order_with_duplicates() {
        let mut api = FakeSpotifyApi::default();
        api.saved
            .push(saved_item("t1", "Duet", &[("x", "X"), ("y", "Y")]));
        api.genres.insert("x".into(), vec!["a".into(), "b".into()]);
        api.genres.insert("y".into(), vec!["b".into(), "c".into()]);

        let outcome = extract_saved_tracks(&api, 50, 1).unwrap();
        assert_eq!(outcome.tracks[0].artist_genres, vec!["a", "b", "b", "c"]);
        assert_eq!(outcome.tracks[0].artists, vec!["X", "Y"]);
        assert_eq!(outcome.tracks[0].artist_ids, vec!["x", "y"]);
    }

    #[test]
    fn shared_artists_are_looked_up_once() {
        let api = library_of(30);
        let outcome = extract_saved_tracks(&api, 50, 1).unwrap();

        let mut lookups = api.artist_calls();
        lookups.sort();
        assert_eq!(lookups, vec!["a0", "a1", "a2"]);
        assert_eq!(outcome.artist_lookups, 3);
    }

    #[test]
    fn parallel_lookup_matches_sequential_output() {
        let sequential = extract_saved_tracks(&library_of(75), 50, 1).unwrap();
        let parallel = extract_saved_tracks(&library_of(75), 50, 4).unwrap();
        assert_eq!(sequential.tracks, parallel.tracks);
    }

    #[test]
    fn items_without_ids_are_skipped() {
        let mut api = FakeSpotifyApi::default();
        api.saved.push(saved_item("t1", "Ok", &[("a", "A")]));
        api.saved.push(SavedTrackItem {
            added_at: "2023".into(),
            track: None,
        });
        api.saved.push(SavedTrackItem {
            added_at: "2023".into(),
            track: Some(Track {
                id: None,
                name: "Local file".into(),
                artists: vec![],
            }),
        });
        api.saved.push(SavedTrackItem {
            added_at: "2023".into(),
            track: Some(Track {
                id: Some("t4".into()),
                name: "Anonymous".into(),
                artists: vec![ArtistRef {
                    id: None,
                    name: "Unknown".into(),
                }],
            }),
        });
        api.genres.insert("a".into(), vec!["jazz".into()]);

        let outcome = extract_saved_tracks(&api, 50, 1).unwrap();
        assert_eq!(outcome.tracks.len(), 1);
        assert_eq!(outcome.skipped_items, 3);
        assert_eq!(outcome.reported_total, 4);
    }

    #[test]
    fn failed_artist_lookup_aborts_extraction() {
        let mut api = library_of(10);
        api.fail_artist = Some("a1".into());
        let err = extract_saved_tracks(&api, 50, 1).unwrap_err();
        assert!(err.to_string().contains("Failed to look up artist a1"));
    }

    #[test]
    fn rejects_out_of_range_limit() {
        let api = FakeSpotifyApi::default();
        assert!(extract_saved_tracks(&api, 0, 1).is_err());
        assert!(extract_saved_tracks(&api, 51, 1).is_err());
        assert!(api.calls().is_empty());
    }

    #[test]
    fn single_page_is_independently_extractable() {
        let api = library_of(60);
        let page = extract_page(&api, 1, 50).unwrap();
        assert_eq!(page.rows.len(), 10);
        assert_eq!(page.rows[0].track_id, "t50");
        assert!(page.rows[0].artist_genres.is_empty());
    }
}

//! One-hot genre membership and the ranked genre frequency table.

use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use super::models::{GenreFrequency, GenreMembershipRow, GenreMembershipTable, GenreTagged};

pub fn genre_membership<T: GenreTagged>(tracks: &[T]) -> GenreMembershipTable {
    let genres: Vec<String> = tracks
        .iter()
        .flat_map(|t| t.artist_genres().iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let column_of: HashMap<&str, usize> = genres
        .iter()
        .enumerate()
        .map(|(i, g)| (g.as_str(), i))
        .collect();

    let rows = tracks
        .iter()
        .map(|t| {
            let mut occurrences = vec![0u32; genres.len()];
            for genre in t.artist_genres() {
                if let Some(&c) = column_of.get(genre.as_str()) {
                    occurrences[c] += 1;
                }
            }
            GenreMembershipRow {
                track_id: t.track_id().to_string(),
                track_name: t.track_name().to_string(),
                artists: t.artists().to_vec(),
                members: occurrences.iter().map(|&n| n > 0).collect(),
                occurrences,
            }
        })
        .collect();

    debug!("Built genre membership with {} columns", genres.len());
    GenreMembershipTable { genres, rows }
}

/// Per-genre occurrence sums over the membership table, most frequent first.
///
/// A genre reached through two artists of one track counts twice.
/// Equal counts are ordered alphabetically.
pub fn genre_frequencies(table: &GenreMembershipTable) -> Vec<GenreFrequency> {
    let mut frequencies: Vec<GenreFrequency> = table
        .genres
        .iter()
        .enumerate()
        .map(|(c, genre)| GenreFrequency {
            genre: genre.clone(),
            count: table.rows.iter().map(|r| r.occurrences[c] as u64).sum(),
        })
        .collect();
    frequencies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.genre.cmp(&b.genre)));
    frequencies
}

/// Membership and ranking in one pass over `tracks`.
pub fn rank_genres<T: GenreTagged>(tracks: &[T]) -> (GenreMembershipTable, Vec<GenreFrequency>) {
    let table = genre_membership(tracks);
    let frequencies = genre_frequencies(&table);
    (table, frequencies)
}

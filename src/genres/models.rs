use serde::Serialize;

use crate::features::EnrichedTrack;
use crate::library::SavedTrackRecord;

/// Any row that carries identifying columns and a flattened genre list.
pub trait GenreTagged {
    fn track_id(&self) -> &str;
    fn track_name(&self) -> &str;
    fn artists(&self) -> &[String];
    fn artist_genres(&self) -> &[String];
}

impl GenreTagged for SavedTrackRecord {
    fn track_id(&self) -> &str {
        &self.track_id
    }
    fn track_name(&self) -> &str {
        &self.track_name
    }
    fn artists(&self) -> &[String] {
        &self.artists
    }
    fn artist_genres(&self) -> &[String] {
        &self.artist_genres
    }
}

impl GenreTagged for EnrichedTrack {
    fn track_id(&self) -> &str {
        &self.track.track_id
    }
    fn track_name(&self) -> &str {
        &self.track.track_name
    }
    fn artists(&self) -> &[String] {
        &self.track.artists
    }
    fn artist_genres(&self) -> &[String] {
        &self.track.artist_genres
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreMembershipRow {
    pub track_id: String,
    pub track_name: String,
    pub artists: Vec<String>,
    /// One-hot membership, one flag per genre column.
    pub members: Vec<bool>,
    /// Occurrences of each genre column in this track's `artist_genres`.
    /// The frequency ranking sums these, so repeated tags keep their multiplicity.
    pub occurrences: Vec<u32>,
}

/// One-hot genre table: identifying columns plus one boolean column per distinct genre.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenreMembershipTable {
    /// Column names, sorted.
    pub genres: Vec<String>,
    pub rows: Vec<GenreMembershipRow>,
}

impl GenreMembershipTable {
    pub fn column(&self, genre: &str) -> Option<usize> {
        self.genres.binary_search_by(|g| g.as_str().cmp(genre)).ok()
    }

    /// Boolean membership of `genre` for the row at `row`.
    pub fn is_member(&self, row: usize, genre: &str) -> bool {
        match (self.rows.get(row), self.column(genre)) {
            (Some(r), Some(c)) => r.members[c],
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreFrequency {
    pub genre: String,
    pub count: u64,
}

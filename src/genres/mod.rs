mod aggregator;
mod models;

pub use aggregator::{genre_frequencies, genre_membership, rank_genres};
pub use models::{GenreFrequency, GenreMembershipRow, GenreMembershipTable, GenreTagged};

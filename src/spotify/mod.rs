//! Spotify Web API seam.
//!
//! [`SpotifyApi`] is the only way the extraction stages reach the network; the
//! real implementation is [`SpotifyClient`].

mod client;
mod error;
pub mod models;
mod trait_def;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{SpotifyClient, SPOTIFY_API_BASE};
pub use error::SpotifyError;
pub use models::{Artist, ArtistRef, AudioFeatures, SavedTrackItem, SavedTracksPage, Track};
pub use trait_def::SpotifyApi;

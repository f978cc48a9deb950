//! Exports a user's saved ("liked") tracks, enriched with artist genres and
//! audio features, into a dated SQLite snapshot.
//!
//! The stages are independent modules wired together by [`pipeline::run`]:
//! [`oauth`] obtains a session, [`library`] extracts the saved tracks,
//! [`features`] joins audio features on, [`genres`] ranks genre tags and
//! [`snapshot`] persists the result.

pub mod cli_style;
pub mod config;
pub mod features;
pub mod genres;
pub mod library;
pub mod oauth;
pub mod pipeline;
pub mod snapshot;
pub mod spotify;
pub mod sqlite_persistence;

//! Common test infrastructure
//!
//! A mock Spotify deployment (accounts service and Web API on one local
//! server) preloaded with a small saved-tracks library.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::MockSpotify;
//!
//! #[test]
//! fn test_export() {
//!     let spotify = MockSpotify::start();
//!     spotify.serve_library();
//!     let client = spotify.client();
//!     // run the pipeline against `client`
//! }
//! ```

mod constants;
mod server;

pub use constants::*;
pub use server::MockSpotify;

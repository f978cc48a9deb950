#![allow(dead_code)]

pub const USERNAME: &str = "test-listener";
pub const ACCESS_TOKEN: &str = "test-access-token";
pub const REFRESH_TOKEN: &str = "test-refresh-token";
pub const CLIENT_ID: &str = "test-client-id";
pub const CLIENT_SECRET: &str = "test-client-secret";
pub const REDIRECT_URI: &str = "http://localhost:8888/callback";

pub const ARTIST_ALPHA_ID: &str = "artist-alpha";
pub const ARTIST_BETA_ID: &str = "artist-beta";

pub const TRACK_INTRO_ID: &str = "track-intro";
pub const TRACK_DUET_ID: &str = "track-duet";
/// Saved but without audio features upstream.
pub const TRACK_DEMO_ID: &str = "track-demo";

/// Saved items including the one local upload without a track id.
pub const SAVED_ITEM_COUNT: usize = 4;

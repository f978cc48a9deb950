use thiserror::Error;

/// Errors returned by the upstream Web API.
///
/// None of these are retried: any of them aborts the current run.
#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for SpotifyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SpotifyError::Timeout
        } else if e.is_decode() {
            SpotifyError::InvalidResponse(e.to_string())
        } else {
            SpotifyError::Connection(e.to_string())
        }
    }
}

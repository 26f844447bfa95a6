use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("rate limited by {url}")]
    RateLimited { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("response from {url} too short: {chars} chars, need more than {min_chars}")]
    ContentTooShort {
        url: String,
        chars: usize,
        min_chars: usize,
    },

    #[error("browser rendering of {url} failed: {reason}")]
    Render { url: String, reason: String },

    #[error("browser rendering of {url} timed out after {timeout_secs}s")]
    RenderTimeout { url: String, timeout_secs: u64 },

    #[error("could not fetch {url}: {direct}; browser fallback disabled")]
    FallbackDisabled { url: String, direct: String },

    #[error("could not fetch {url}: {direct}; browser fallback: {browser}")]
    AllStrategiesFailed {
        url: String,
        direct: String,
        browser: String,
    },
}

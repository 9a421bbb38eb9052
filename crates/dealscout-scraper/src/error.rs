use dealscout_core::{CoreError, Source};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid extraction request: {0}")]
    InvalidRequest(#[from] CoreError),

    #[error("every requested source failed for \"{search}\"")]
    AllSourcesFailed { search: String },

    #[error("{site} extraction failed: {reason}")]
    Extraction { site: Source, reason: String },
}

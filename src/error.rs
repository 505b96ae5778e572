use std::time::Duration;

use thiserror::Error;

/// Errors produced by the fetch-aggregate-cache pipeline.
///
/// Variants carry rendered messages rather than source errors so the type
/// stays `Clone`: one refresh result is handed to every caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NewsError {
    #[error("HTTP request error for {url}: {message}")]
    Http { url: String, message: String },

    #[error("{url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("Feed parsing error for {url}: {message}")]
    FeedParse { url: String, message: String },

    #[error("{url} did not respond within {}s", .budget.as_secs())]
    Timeout { url: String, budget: Duration },

    #[error("All {0} feeds failed to load")]
    AllFeedsFailed(usize),

    #[error("Refresh aborted: {0}")]
    RefreshAborted(String),
}

pub type Result<T> = std::result::Result<T, NewsError>;

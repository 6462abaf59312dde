//! Feed error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Empty watch list")]
    EmptyWatchList,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FeedResult<T> = Result<T, FeedError>;

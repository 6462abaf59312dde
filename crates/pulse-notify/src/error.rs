//! Notification errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Delivery rejected: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Notifier misconfigured: {0}")]
    Config(String),
}

pub type NotifyResult<T> = Result<T, NotifyError>;

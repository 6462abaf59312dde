//! WebSocket transport errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WsError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection closed by server: code={code}, reason={reason}")]
    ConnectionClosed { code: u16, reason: String },

    #[error("Reconnect attempt ceiling reached after {0} attempts")]
    AttemptsExhausted(u32),

    #[error("WebSocket error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type WsResult<T> = Result<T, WsError>;

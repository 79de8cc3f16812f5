//! Errors at the network boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {0}")]
    Status(reqwest::StatusCode),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unrecognized frame")]
    UnrecognizedFrame,
}

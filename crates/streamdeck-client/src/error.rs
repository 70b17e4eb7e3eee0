//! Error types for the plugin runtime.

use streamdeck_core::EventKind;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors returned to the caller by registration, `connect` and `send`.
///
/// Problems with individual inbound frames never surface here; the read
/// loop logs and drops them.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A handler is already registered for this event.
    #[error("handler for {0} already registered")]
    DuplicateHandler(EventKind),

    /// The handler names an event outside the known set.
    #[error("no inbound event named {0:?}")]
    InvalidHandler(String),

    /// Opening the WebSocket failed.
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    /// Writing the registration frame failed.
    #[error("failed to send registration: {0}")]
    Handshake(#[source] tungstenite::Error),

    /// The WebSocket failed while writing a command.
    #[error("WebSocket error: {0}")]
    Transport(#[from] tungstenite::Error),

    /// A command could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The connection has already closed.
    #[error("connection closed")]
    Closed,
}

/// Result type alias using ClientError.
pub type Result<T> = std::result::Result<T, ClientError>;

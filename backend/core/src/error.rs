use thiserror::Error;

/// Top-level error type for the tavern runtime.
#[derive(Debug, Error)]
pub enum TavernError {
    #[error("command `{command}` failed: {detail}")]
    HandlerExecution { command: String, detail: String },

    #[error("platform connection error: {0}")]
    PlatformConnection(String),

    #[error("disconnected: {reason} (code: {code:?})")]
    PlatformDisconnect { reason: String, code: Option<u16> },

    #[error("channel closed: {0}")]
    ChannelClosed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

use std::fmt;

use crate::message::IncomingMessage;
use crate::types::BotIdentity;

/// Events an adapter delivers to the bot supervisor.
#[derive(Debug, Clone)]
pub enum PlatformEvent {
    /// Logged in and ready to receive messages.
    Ready(BotIdentity),
    /// A new chat message.
    Message(IncomingMessage),
    /// A client-level error; the client keeps running.
    Error(String),
    /// The client lost its session and is re-establishing it.
    Reconnecting,
    /// A previously lost session was resumed.
    Resumed,
    /// The connection closed.
    Disconnect { reason: String, code: Option<u16> },
}

impl PlatformEvent {
    /// Short label for log fields.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Ready(_) => EventKind::Ready,
            Self::Message(_) => EventKind::Message,
            Self::Error(_) => EventKind::Error,
            Self::Reconnecting => EventKind::Reconnecting,
            Self::Resumed => EventKind::Resumed,
            Self::Disconnect { .. } => EventKind::Disconnect,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Ready,
    Message,
    Error,
    Reconnecting,
    Resumed,
    Disconnect,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ready => "ready",
            Self::Message => "message",
            Self::Error => "error",
            Self::Reconnecting => "reconnecting",
            Self::Resumed => "resumed",
            Self::Disconnect => "disconnect",
        };
        f.write_str(s)
    }
}

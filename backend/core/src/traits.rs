use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::event::PlatformEvent;
use crate::message::OutgoingMessage;

/// Outbound half of a message: where replies go.
///
/// Each platform adapter implements this for the message it delivered.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Post to the originating channel.
    async fn send(&self, message: OutgoingMessage) -> Result<()>;

    /// Reply to the author of the originating message.
    async fn reply(&self, message: OutgoingMessage) -> Result<()>;
}

/// A connection to a chat platform.
///
/// Adapters own authentication, reconnects and event delivery. They push
/// [`PlatformEvent`]s one at a time into `events` until the connection ends.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Human-readable adapter name for logging.
    fn name(&self) -> &str;

    /// Connect with `token` and forward events until the client stops.
    async fn connect(&self, token: &str, events: mpsc::Sender<PlatformEvent>) -> Result<()>;
}

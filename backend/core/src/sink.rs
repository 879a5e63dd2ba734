use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use crate::message::OutgoingMessage;
use crate::traits::MessageSink;

/// How a message was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Posted to the originating channel.
    Send,
    /// Addressed to the message author.
    Reply,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub mode: DeliveryMode,
    pub message: OutgoingMessage,
}

/// Sink that keeps deliveries in memory.
///
/// The console adapter drains it after each dispatch; tests inspect it directly.
#[derive(Debug, Default)]
pub struct MemorySink {
    deliveries: Mutex<Vec<Delivery>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far.
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.lock().clone()
    }

    /// Remove and return everything delivered so far.
    pub fn take(&self) -> Vec<Delivery> {
        std::mem::take(&mut *self.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn push(&self, mode: DeliveryMode, message: OutgoingMessage) {
        self.lock().push(Delivery { mode, message });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Delivery>> {
        // A poisoned lock only means a panicking writer; the Vec is still usable.
        self.deliveries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MessageSink for MemorySink {
    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        self.push(DeliveryMode::Send, message);
        Ok(())
    }

    async fn reply(&self, message: OutgoingMessage) -> Result<()> {
        self.push(DeliveryMode::Reply, message);
        Ok(())
    }
}

use tokio::sync::mpsc;
use tracing::debug;

use crate::event::PlatformEvent;

/// Default channel buffer size for adapter → supervisor events.
const DEFAULT_BUFFER_SIZE: usize = 64;

/// Event channel connecting one platform adapter to one bot supervisor.
///
/// Built on a bounded Tokio mpsc channel so a slow dispatcher applies
/// backpressure to the adapter instead of buffering without limit.
pub struct EventBus {
    pub tx: mpsc::Sender<PlatformEvent>,
    rx: Option<mpsc::Receiver<PlatformEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_buffer_size(DEFAULT_BUFFER_SIZE)
    }

    pub fn with_buffer_size(buffer: usize) -> Self {
        let (tx, rx) = mpsc::channel(buffer);
        debug!(buffer_size = buffer, "EventBus initialized");
        Self { tx, rx: Some(rx) }
    }

    /// Take the receiver (can only be called once).
    pub fn take_rx(&mut self) -> Option<mpsc::Receiver<PlatformEvent>> {
        self.rx.take()
    }

    /// Consume the bus into its two halves. `None` if the receiver was already taken.
    pub fn into_parts(mut self) -> Option<(mpsc::Sender<PlatformEvent>, mpsc::Receiver<PlatformEvent>)> {
        let rx = self.rx.take()?;
        Some((self.tx, rx))
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bus_send_receive() {
        let mut bus = EventBus::new();
        let mut rx = bus.take_rx().unwrap();
        bus.tx.send(PlatformEvent::Reconnecting).await.unwrap();
        let received = rx.recv().await.unwrap();
        assert!(matches!(received, PlatformEvent::Reconnecting));
    }

    #[tokio::test]
    async fn test_bus_take_rx_once() {
        let mut bus = EventBus::new();
        assert!(bus.take_rx().is_some());
        assert!(bus.take_rx().is_none());
    }

    #[tokio::test]
    async fn test_bus_into_parts_closes_when_senders_drop() {
        let (tx, mut rx) = EventBus::new().into_parts().unwrap();
        tx.send(PlatformEvent::Resumed).await.unwrap();
        drop(tx);
        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_bus_backpressure() {
        let mut bus = EventBus::with_buffer_size(1);
        let _rx = bus.take_rx().unwrap();
        bus.tx.send(PlatformEvent::Resumed).await.unwrap();
        assert!(bus.tx.try_send(PlatformEvent::Resumed).is_err());
    }
}

//! Signal bus between the transport pump and the UI.
//!
//! Snapshots carry the whole conversation, so a receiver that lags behind
//! loses nothing by skipping to the newest one.

use super::TransportSignal;
use crate::transcript::Conversation;
use tokio::sync::broadcast;

/// Sender half of the signal bus.
#[derive(Clone)]
pub struct SignalSender {
    tx: broadcast::Sender<TransportSignal>,
}

impl SignalSender {
    /// Send a signal.
    pub fn send(&self, signal: TransportSignal) -> Result<(), BusError> {
        self.tx.send(signal).map_err(|_| BusError::Closed)?;
        Ok(())
    }

    /// Publish a snapshot.
    pub fn snapshot(&self, conversation: Conversation) {
        let _ = self.send(TransportSignal::Snapshot(conversation));
    }

    /// Signal completion.
    pub fn finished(&self) {
        let _ = self.send(TransportSignal::Finished);
    }

    /// Signal failure.
    pub fn failed(&self, message: impl Into<String>) {
        let _ = self.send(TransportSignal::failed(message));
    }
}

/// Receiver half of the signal bus.
pub struct SignalReceiver {
    rx: broadcast::Receiver<TransportSignal>,
}

impl SignalReceiver {
    /// Receive the next signal.
    pub async fn recv(&mut self) -> Result<TransportSignal, BusError> {
        self.rx.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => BusError::Closed,
            broadcast::error::RecvError::Lagged(n) => BusError::Lagged(n),
        })
    }

    /// Try to receive a signal without waiting.
    pub fn try_recv(&mut self) -> Result<Option<TransportSignal>, BusError> {
        match self.rx.try_recv() {
            Ok(signal) => Ok(Some(signal)),
            Err(broadcast::error::TryRecvError::Empty) => Ok(None),
            Err(broadcast::error::TryRecvError::Closed) => Err(BusError::Closed),
            Err(broadcast::error::TryRecvError::Lagged(n)) => Err(BusError::Lagged(n)),
        }
    }
}

/// Broadcast bus for transport signals.
pub struct SignalBus {
    tx: broadcast::Sender<TransportSignal>,
}

impl SignalBus {
    /// Create a new signal bus.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Get a sender.
    pub fn sender(&self) -> SignalSender {
        SignalSender {
            tx: self.tx.clone(),
        }
    }

    /// Subscribe to signals.
    pub fn subscribe(&self) -> SignalReceiver {
        SignalReceiver {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Bus errors.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Channel closed")]
    Closed,
    #[error("Lagged behind by {0} signals")]
    Lagged(u64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Message;

    // =========================================================================
    // SignalBus Tests
    // =========================================================================

    #[test]
    fn test_sender_is_clone() {
        let bus = SignalBus::new();
        let sender1 = bus.sender();
        let sender2 = sender1.clone();
        let mut receiver = bus.subscribe();

        sender1.finished();
        sender2.failed("boom");

        assert_eq!(receiver.try_recv().unwrap(), Some(TransportSignal::Finished));
        assert_eq!(
            receiver.try_recv().unwrap(),
            Some(TransportSignal::Failed("boom".into()))
        );
    }

    #[test]
    fn test_send_without_receivers_is_closed() {
        let bus = SignalBus::new();
        let result = bus.sender().send(TransportSignal::Finished);
        assert!(matches!(result, Err(BusError::Closed)));

        // Helpers swallow the error.
        bus.sender().finished();
        bus.sender().snapshot(Conversation::new());
    }

    #[test]
    fn test_try_recv_empty() {
        let bus = SignalBus::new();
        let mut receiver = bus.subscribe();
        assert!(receiver.try_recv().unwrap().is_none());
    }

    // =========================================================================
    // SignalReceiver Tests
    // =========================================================================

    #[tokio::test]
    async fn test_recv_in_order() {
        let bus = SignalBus::new();
        let sender = bus.sender();
        let mut receiver = bus.subscribe();

        let snapshot = Conversation::from(vec![Message::user("ping")]);
        sender.snapshot(snapshot.clone());
        sender.finished();

        assert_eq!(
            receiver.recv().await.unwrap(),
            TransportSignal::Snapshot(snapshot)
        );
        assert_eq!(receiver.recv().await.unwrap(), TransportSignal::Finished);
    }

    #[tokio::test]
    async fn test_recv_closed() {
        let bus = SignalBus::new();
        let mut receiver = bus.subscribe();
        drop(bus);

        assert!(matches!(receiver.recv().await, Err(BusError::Closed)));
    }

    #[tokio::test]
    async fn test_lagged_receiver_still_sees_terminal_signal() {
        let bus = SignalBus::with_capacity(2);
        let sender = bus.sender();
        let mut receiver = bus.subscribe();

        for _ in 0..5 {
            sender.snapshot(Conversation::new());
        }
        sender.finished();

        let mut saw_lag = false;
        let last = loop {
            match receiver.recv().await {
                Ok(signal) if signal.is_terminal() => break signal,
                Ok(_) => {}
                Err(BusError::Lagged(n)) => {
                    assert!(n > 0);
                    saw_lag = true;
                }
                Err(BusError::Closed) => panic!("Expected terminal signal"),
            }
        };
        assert!(saw_lag);
        assert_eq!(last, TransportSignal::Finished);
    }

    #[test]
    fn test_bus_error_display() {
        assert_eq!(BusError::Closed.to_string(), "Channel closed");
        assert_eq!(BusError::Lagged(42).to_string(), "Lagged behind by 42 signals");
    }
}

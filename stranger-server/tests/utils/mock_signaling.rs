use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use stranger_core::{ConnectionId, SignalMessage};
use stranger_server::{SignalingError, SignalingOutput};
use tokio::sync::{Mutex, mpsc};

/// Mock SignalingOutput that captures all outgoing signals.
#[derive(Clone)]
pub struct MockSignalingOutput {
    /// Channel to send captured signals.
    tx: mpsc::UnboundedSender<(ConnectionId, SignalMessage)>,
    /// All captured signals (for verification).
    signals: Arc<Mutex<Vec<(ConnectionId, SignalMessage)>>>,
    /// Targets that behave like closed connections.
    unreachable: Arc<Mutex<HashSet<ConnectionId>>>,
}

impl MockSignalingOutput {
    /// Create a new MockSignalingOutput and its receiver channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(ConnectionId, SignalMessage)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let signaling = Self {
            tx,
            signals: Arc::new(Mutex::new(Vec::new())),
            unreachable: Arc::new(Mutex::new(HashSet::new())),
        };
        (signaling, rx)
    }

    /// Create a MockSignalingOutput without a receiver (signals are only stored).
    pub fn new_stored_only() -> Self {
        Self::new().0
    }

    pub async fn mark_unreachable(&self, target: ConnectionId) {
        self.unreachable.lock().await.insert(target);
    }

    /// Everything delivered to `target`, in order.
    pub async fn sent_to(&self, target: &ConnectionId) -> Vec<SignalMessage> {
        self.signals
            .lock()
            .await
            .iter()
            .filter(|(id, _)| id == target)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.signals.lock().await.len()
    }
}

impl Default for MockSignalingOutput {
    fn default() -> Self {
        Self::new_stored_only()
    }
}

#[async_trait]
impl SignalingOutput for MockSignalingOutput {
    async fn send_signal(
        &self,
        target: &ConnectionId,
        msg: SignalMessage,
    ) -> Result<(), SignalingError> {
        tracing::debug!("[MockSignaling] {} to {}", msg.kind(), target);

        if self.unreachable.lock().await.contains(target) {
            return Err(SignalingError::UnknownTarget(*target));
        }

        self.signals.lock().await.push((*target, msg.clone()));
        let _ = self.tx.send((*target, msg));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_signaling_captures_per_target() {
        let (signaling, mut rx) = MockSignalingOutput::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();

        signaling.send_signal(&a, SignalMessage::PeerLeft).await.unwrap();
        signaling.send_signal(&b, SignalMessage::Leave).await.unwrap();

        let (target, msg) = rx.recv().await.unwrap();
        assert_eq!(target, a);
        assert_eq!(msg, SignalMessage::PeerLeft);
        assert_eq!(signaling.sent_to(&b).await, vec![SignalMessage::Leave]);
    }

    #[tokio::test]
    async fn test_mock_signaling_unreachable_target() {
        let signaling = MockSignalingOutput::new_stored_only();
        let gone = ConnectionId::new();
        signaling.mark_unreachable(gone).await;

        let result = signaling.send_signal(&gone, SignalMessage::PeerLeft).await;

        assert!(matches!(result, Err(SignalingError::UnknownTarget(id)) if id == gone));
        assert_eq!(signaling.count().await, 0);
    }
}

use crate::signaling::SignalingOutput;
use std::sync::Arc;
use stranger_core::{ConnectionId, SignalMessage};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// Target gone or the message is not relayable; nothing was sent.
    Dropped,
}

/// Forwards offer/answer/ICE messages between connections without looking
/// inside them.
#[derive(Clone)]
pub struct SignalingRelay {
    output: Arc<dyn SignalingOutput>,
}

impl SignalingRelay {
    pub fn new(output: Arc<dyn SignalingOutput>) -> Self {
        Self { output }
    }

    /// Delivers `message` to `target` as is. A target that is not connected
    /// is not an error for the sender: the message is dropped.
    pub async fn relay(&self, message: SignalMessage, target: &ConnectionId) -> Delivery {
        let kind = message.kind();

        match self.output.send_signal(target, message).await {
            Ok(()) => {
                debug!("Relayed {} to {}", kind, target);
                Delivery::Delivered
            }
            Err(e) => {
                debug!("Dropped {} for {}: {}", kind, target, e);
                Delivery::Dropped
            }
        }
    }

    /// Relays a message received from `sender` to the target it names.
    pub async fn forward(&self, sender: &ConnectionId, message: SignalMessage) -> Delivery {
        let Some(target) = message.target().copied() else {
            warn!(
                "{} sent a non-relayable '{}' message",
                sender,
                message.kind()
            );
            return Delivery::Dropped;
        };

        self.relay(message, &target).await
    }
}

use crate::config::SignalingConfig;
use crate::lifecycle::{LeaveReason, LifecycleManager};
use crate::registry::{ConnectionRegistry, RoomRegistry};
use crate::signaling::SignalingRelay;
use std::ops::ControlFlow;
use std::sync::Arc;
use stranger_core::{ConnectionId, SignalMessage};
use tracing::warn;

struct SignalingInner {
    connections: Arc<ConnectionRegistry>,
    rooms: Arc<RoomRegistry>,
    lifecycle: LifecycleManager,
    relay: SignalingRelay,
}

/// Shared server state handed to every connection handler.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(config: SignalingConfig) -> Self {
        let connections = Arc::new(ConnectionRegistry::new());
        let rooms = Arc::new(RoomRegistry::new());
        let lifecycle =
            LifecycleManager::new(connections.clone(), rooms.clone(), connections.clone(), &config);
        let relay = SignalingRelay::new(connections.clone());

        Self {
            inner: Arc::new(SignalingInner {
                connections,
                rooms,
                lifecycle,
                relay,
            }),
        }
    }

    pub fn connections(&self) -> &ConnectionRegistry {
        &self.inner.connections
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.inner.rooms
    }

    pub fn lifecycle(&self) -> &LifecycleManager {
        &self.inner.lifecycle
    }

    pub fn relay(&self) -> &SignalingRelay {
        &self.inner.relay
    }

    /// Routes one inbound message from `sender`. `Break` means the sender asked
    /// to leave and its connection should be closed.
    pub async fn dispatch(&self, sender: ConnectionId, signal: SignalMessage) -> ControlFlow<()> {
        match signal {
            SignalMessage::Join { room_id } => {
                // Failures were already reported to the sender.
                let _ = self.inner.lifecycle.join(sender, room_id).await;
            }
            msg @ (SignalMessage::Offer { .. }
            | SignalMessage::Answer { .. }
            | SignalMessage::IceCandidate { .. }) => {
                self.inner.relay.forward(&sender, msg).await;
            }
            SignalMessage::Leave => {
                self.inner
                    .lifecycle
                    .leave(&sender, LeaveReason::Requested)
                    .await;
                return ControlFlow::Break(());
            }
            other => {
                warn!(
                    "{} sent server-only message '{}'; ignoring",
                    sender,
                    other.kind()
                );
            }
        }

        ControlFlow::Continue(())
    }

    /// Transport-level disconnect.
    pub async fn disconnect(&self, id: &ConnectionId) {
        self.inner
            .lifecycle
            .leave(id, LeaveReason::TransportLost)
            .await;
    }
}

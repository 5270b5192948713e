use crate::error::SignalingError;
use crate::lifecycle::ConnectionState;
use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use dashmap::DashMap;
use stranger_core::{ConnectionId, SignalMessage};
use tokio::sync::mpsc;
use tracing::{debug, warn};

struct ConnectionEntry {
    outbound: mpsc::UnboundedSender<SignalMessage>,
    state: ConnectionState,
}

/// Live transport connections. Written on connect/disconnect and on lifecycle
/// transitions; read by everything that delivers messages.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, ConnectionEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: ConnectionId, outbound: mpsc::UnboundedSender<SignalMessage>) {
        let entry = ConnectionEntry {
            outbound,
            state: ConnectionState::Connecting,
        };

        if self.connections.insert(id, entry).is_some() {
            warn!("Connection {} registered twice; previous channel replaced", id);
        }
    }

    pub fn remove(&self, id: &ConnectionId) -> bool {
        self.connections.remove(id).is_some()
    }

    pub fn is_live(&self, id: &ConnectionId) -> bool {
        self.connections
            .get(id)
            .is_some_and(|entry| !entry.outbound.is_closed())
    }

    pub fn state(&self, id: &ConnectionId) -> Option<ConnectionState> {
        self.connections.get(id).map(|entry| entry.state)
    }

    pub fn set_state(&self, id: &ConnectionId, state: ConnectionState) {
        if let Some(mut entry) = self.connections.get_mut(id) {
            debug!("{}: {:?} -> {:?}", id, entry.state, state);
            entry.state = state;
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Queues `msg` on the target's outbound channel without waiting.
    pub fn deliver(&self, target: &ConnectionId, msg: SignalMessage) -> Result<(), SignalingError> {
        let Some(entry) = self.connections.get(target) else {
            return Err(SignalingError::UnknownTarget(*target));
        };

        entry
            .outbound
            .send(msg)
            .map_err(|_| SignalingError::UnknownTarget(*target))
    }
}

#[async_trait]
impl SignalingOutput for ConnectionRegistry {
    async fn send_signal(
        &self,
        target: &ConnectionId,
        msg: SignalMessage,
    ) -> Result<(), SignalingError> {
        self.deliver(target, msg)
    }
}

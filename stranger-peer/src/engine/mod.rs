use crate::negotiation::{NegotiationCoordinator, NegotiationEvent};
use crate::peer::{PeerConnectionFactory, SignalSink};
use anyhow::Result;
use std::sync::Arc;
use stranger_core::{ConnectionId, IceServerConfig, RoomId, SignalMessage};
use tokio::sync::mpsc;
use tracing::info;

mod handle_signal_impl;
mod session_impl;

/// Client side of one signaling connection.
///
/// Consumes server messages and local peer-connection events in a single loop
/// and keeps at most one [`NegotiationCoordinator`] alive, rebuilt per pairing.
pub struct CallEngine {
    local_id: Option<ConnectionId>,
    room_id: Option<RoomId>,
    ice_servers: Vec<IceServerConfig>,
    coordinator: Option<NegotiationCoordinator>,
    factory: Arc<dyn PeerConnectionFactory>,
    outbound: Arc<dyn SignalSink>,
    inbound: mpsc::UnboundedReceiver<SignalMessage>,
    local_events: Option<mpsc::UnboundedReceiver<NegotiationEvent>>,
}

impl CallEngine {
    pub fn new(
        factory: Arc<dyn PeerConnectionFactory>,
        outbound: Arc<dyn SignalSink>,
        inbound: mpsc::UnboundedReceiver<SignalMessage>,
    ) -> Self {
        Self {
            local_id: None,
            room_id: None,
            ice_servers: Vec::new(),
            coordinator: None,
            factory,
            outbound,
            inbound,
            local_events: None,
        }
    }

    /// Assigned by the server's `welcome`.
    pub fn local_id(&self) -> Option<ConnectionId> {
        self.local_id
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.room_id.as_ref()
    }

    pub fn ice_servers(&self) -> &[IceServerConfig] {
        &self.ice_servers
    }

    pub fn coordinator(&self) -> Option<&NegotiationCoordinator> {
        self.coordinator.as_ref()
    }

    pub fn join(&self, room_id: Option<RoomId>) -> Result<()> {
        self.outbound.send_signal(SignalMessage::Join { room_id })
    }

    pub async fn leave(&mut self) -> Result<()> {
        self.close_session().await;
        self.room_id = None;
        self.outbound.send_signal(SignalMessage::Leave)
    }

    /// Local tracks changed; starts a new offer/answer round.
    pub async fn renegotiate(&mut self) {
        self.drive(NegotiationEvent::Renegotiate).await;
    }

    pub async fn handle_local_event(&mut self, event: NegotiationEvent) {
        self.drive(event).await;
    }

    /// Handles the next server message or local peer event. Returns `false`
    /// once the server side of the connection is gone.
    pub async fn step(&mut self) -> bool {
        tokio::select! {
            msg = self.inbound.recv() => match msg {
                Some(msg) => {
                    self.handle_signal(msg).await;
                    true
                }
                None => false,
            },
            event = next_local_event(&mut self.local_events) => {
                match event {
                    Some(event) => self.handle_local_event(event).await,
                    None => self.local_events = None,
                }
                true
            }
        }
    }

    /// Runs until the signaling connection closes, then hands the engine
    /// back. An established call outlives the signaling connection.
    pub async fn run(mut self) -> Self {
        while self.step().await {}
        info!("Signaling connection closed");
        self
    }
}

async fn next_local_event(
    events: &mut Option<mpsc::UnboundedReceiver<NegotiationEvent>>,
) -> Option<NegotiationEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

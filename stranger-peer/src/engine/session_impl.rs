use crate::engine::CallEngine;
use crate::negotiation::{NegotiationCoordinator, NegotiationEvent, Role};
use stranger_core::ConnectionId;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

impl CallEngine {
    /// Replaces any current session with a fresh one towards `peer_id`.
    pub(super) async fn pair(&mut self, peer_id: ConnectionId, role: Role) {
        let Some(local_id) = self.local_id else {
            warn!("Paired with {} before welcome; ignoring", peer_id);
            return;
        };

        self.close_session().await;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let peer = match self.factory.create(&self.ice_servers, events_tx).await {
            Ok(peer) => peer,
            Err(e) => {
                error!("Failed to create peer connection for {}: {:#}", peer_id, e);
                return;
            }
        };

        self.local_events = Some(events_rx);
        self.coordinator = Some(NegotiationCoordinator::new(
            local_id,
            peer_id,
            role,
            peer.clone(),
            self.outbound.clone(),
        ));
        info!("Paired with {} as {:?}", peer_id, role);

        if role == Role::Caller {
            if let Err(e) = peer.add_local_tracks().await {
                error!("Failed to add local tracks: {:#}", e);
                return;
            }
            self.drive(NegotiationEvent::NegotiationNeeded).await;
        }
    }

    pub(super) async fn drive(&mut self, event: NegotiationEvent) {
        let Some(coordinator) = self.coordinator.as_mut() else {
            debug!("No active session; dropping {}", event.kind());
            return;
        };

        let kind = event.kind();
        if let Err(e) = coordinator.handle(event).await {
            warn!("Negotiation step {} failed: {}", kind, e);
        }
    }

    pub(super) async fn close_session(&mut self) {
        if let Some(mut coordinator) = self.coordinator.take() {
            let _ = coordinator.handle(NegotiationEvent::PeerLeft).await;
        }
        self.local_events = None;
    }
}

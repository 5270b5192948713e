use crate::engine::CallEngine;
use crate::negotiation::{NegotiationEvent, Role};
use stranger_core::SignalMessage;
use tracing::{info, warn};

impl CallEngine {
    pub(super) async fn handle_signal(&mut self, msg: SignalMessage) {
        match msg {
            SignalMessage::Welcome { connection_id } => {
                info!("Received welcome, connection id {}", connection_id);
                self.local_id = Some(connection_id);
            }

            SignalMessage::IceConfig { ice_servers } => {
                info!("Received ICE config: {} servers", ice_servers.len());
                self.ice_servers = ice_servers;
            }

            SignalMessage::Waiting { room_id } => {
                info!("Waiting for a peer in room {}", room_id);
                self.room_id = Some(room_id);
            }

            SignalMessage::PeerIdentity {
                peer_connection_id,
                is_initiator,
            } => {
                self.pair(peer_connection_id, Role::from_initiator(is_initiator))
                    .await;
            }

            SignalMessage::Offer { from, sdp, .. } => {
                if self.coordinator.is_none() {
                    self.pair(from, Role::Callee).await;
                }
                self.drive(NegotiationEvent::RemoteOffer { from, sdp }).await;
            }

            SignalMessage::Answer { from, sdp, .. } => {
                self.drive(NegotiationEvent::RemoteAnswer { from, sdp }).await;
            }

            SignalMessage::IceCandidate { candidate, .. } => {
                self.drive(NegotiationEvent::RemoteCandidate(candidate))
                    .await;
            }

            SignalMessage::PeerLeft => {
                info!("Peer left; closing session");
                self.close_session().await;
            }

            SignalMessage::Error { code, message } => {
                warn!("Server error {:?}: {}", code, message);
            }

            other @ (SignalMessage::Join { .. } | SignalMessage::Leave) => {
                warn!("Unexpected client-bound message '{}'", other.kind());
            }
        }
    }
}

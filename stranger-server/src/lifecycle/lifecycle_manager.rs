use crate::config::{InitiatorPolicy, PairingPolicy, SignalingConfig};
use crate::error::RegistryError;
use crate::lifecycle::ConnectionState;
use crate::registry::{ConnectionRegistry, Departure, RoomRegistry};
use crate::signaling::SignalingOutput;
use std::sync::Arc;
use stranger_core::{ConnectionId, IceServerConfig, RoomId, SignalMessage};
use tokio::sync::{Mutex, mpsc};
use tracing::{info, warn};

/// Attempts at joining an existing room before falling back to a fresh one.
const MAX_PAIRING_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveReason {
    Requested,
    TransportLost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub room_id: RoomId,
    /// Set when the join completed a pair.
    pub peer: Option<ConnectionId>,
}

/// Reacts to connect, join, leave and disconnect. The only component that
/// mutates room membership or removes connections.
#[derive(Clone)]
pub struct LifecycleManager {
    connections: Arc<ConnectionRegistry>,
    rooms: Arc<RoomRegistry>,
    output: Arc<dyn SignalingOutput>,
    pairing: PairingPolicy,
    initiator: InitiatorPolicy,
    ice_servers: Arc<Vec<IceServerConfig>>,
    // Membership changes and the notifications they cause are emitted in one
    // critical section, so a survivor never sees `peer-left` ahead of the
    // `peer-identity` that introduced the departed peer.
    membership: Arc<Mutex<()>>,
}

impl LifecycleManager {
    pub fn new(
        connections: Arc<ConnectionRegistry>,
        rooms: Arc<RoomRegistry>,
        output: Arc<dyn SignalingOutput>,
        config: &SignalingConfig,
    ) -> Self {
        Self {
            connections,
            rooms,
            output,
            pairing: config.pairing,
            initiator: config.initiator,
            ice_servers: Arc::new(config.ice_servers.clone()),
            membership: Arc::new(Mutex::new(())),
        }
    }

    /// Registers a fresh transport connection and greets it.
    pub async fn connect(&self, id: ConnectionId, outbound: mpsc::UnboundedSender<SignalMessage>) {
        self.connections.register(id, outbound);
        info!("Connection {} established", id);

        self.notify(&id, SignalMessage::Welcome { connection_id: id })
            .await;
        self.notify(
            &id,
            SignalMessage::IceConfig {
                ice_servers: self.ice_servers.as_ref().clone(),
            },
        )
        .await;
    }

    /// Seats `id` in a room, pairing it with a waiting participant when
    /// possible. A connection that already sits in a room leaves it first.
    pub async fn join(
        &self,
        id: ConnectionId,
        requested: Option<RoomId>,
    ) -> Result<JoinOutcome, RegistryError> {
        let _guard = self.membership.lock().await;

        if self.rooms.room_of(&id).is_some() {
            info!("{} re-joining; leaving its current room first", id);
            self.vacate(&id).await;
        }

        self.connections.set_state(&id, ConnectionState::Joined);

        let outcome = match self.seat(id, requested.as_ref()) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Join for {} failed: {}", id, e);
                self.connections.set_state(&id, ConnectionState::Connecting);
                self.notify(
                    &id,
                    SignalMessage::Error {
                        code: e.code(),
                        message: e.to_string(),
                    },
                )
                .await;
                return Err(e);
            }
        };

        match outcome.peer {
            Some(peer) => self.announce_pair(&outcome.room_id, peer, id).await,
            None => {
                self.connections
                    .set_state(&id, ConnectionState::WaitingForPeer);
                self.notify(
                    &id,
                    SignalMessage::Waiting {
                        room_id: outcome.room_id.clone(),
                    },
                )
                .await;
            }
        }

        Ok(outcome)
    }

    /// Explicit leave and transport loss both end up here. Safe to call more
    /// than once for the same connection.
    pub async fn leave(&self, id: &ConnectionId, reason: LeaveReason) -> Option<Departure> {
        let _guard = self.membership.lock().await;

        let departure = self.vacate(id).await;

        if self.connections.state(id).is_some() {
            self.connections.set_state(id, ConnectionState::Left);
            self.connections.remove(id);
            info!("Connection {} closed ({:?})", id, reason);
        }

        departure
    }

    pub fn state(&self, id: &ConnectionId) -> Option<ConnectionState> {
        self.connections.state(id)
    }

    /// Finds or creates a room for `id`. Losing a race for a second slot is
    /// retried against whatever room is pairable next.
    fn seat(
        &self,
        id: ConnectionId,
        requested: Option<&RoomId>,
    ) -> Result<JoinOutcome, RegistryError> {
        for _ in 0..MAX_PAIRING_ATTEMPTS {
            match self.rooms.find_pairable_room(requested, self.pairing) {
                Some(room_id) => match self.rooms.join(&room_id, id) {
                    Ok(peer) => return Ok(JoinOutcome { room_id, peer }),
                    Err(e) if e.is_retryable() => continue,
                    Err(e) => return Err(e),
                },
                None => {
                    let room_id = self.fresh_room_id(requested);
                    match self.rooms.create_room(room_id, id) {
                        Ok(room_id) => return Ok(JoinOutcome { room_id, peer: None }),
                        Err(e) if self.pairing == PairingPolicy::Explicit => return Err(e),
                        Err(_) => continue,
                    }
                }
            }
        }

        let room_id = self.rooms.create_room(RoomId::generate(), id)?;
        Ok(JoinOutcome { room_id, peer: None })
    }

    fn fresh_room_id(&self, requested: Option<&RoomId>) -> RoomId {
        match (self.pairing, requested) {
            (PairingPolicy::Explicit, Some(id)) => id.clone(),
            (PairingPolicy::Random, Some(id)) if self.rooms.room(id).is_none() => id.clone(),
            _ => RoomId::generate(),
        }
    }

    async fn announce_pair(&self, room_id: &RoomId, occupant: ConnectionId, joiner: ConnectionId) {
        let occupant_initiates = self.initiator == InitiatorPolicy::Occupant;
        info!(
            "Room {} paired {} with {}; {} initiates",
            room_id,
            occupant,
            joiner,
            if occupant_initiates { occupant } else { joiner }
        );

        self.connections.set_state(&occupant, ConnectionState::Paired);
        self.connections.set_state(&joiner, ConnectionState::Paired);

        self.notify(
            &occupant,
            SignalMessage::PeerIdentity {
                peer_connection_id: joiner,
                is_initiator: occupant_initiates,
            },
        )
        .await;
        self.notify(
            &joiner,
            SignalMessage::PeerIdentity {
                peer_connection_id: occupant,
                is_initiator: !occupant_initiates,
            },
        )
        .await;
    }

    /// Takes `id` out of its room and tells the survivor. Caller holds the
    /// membership lock.
    async fn vacate(&self, id: &ConnectionId) -> Option<Departure> {
        let departure = self.rooms.leave(id)?;

        if let Some(survivor) = departure.remaining {
            self.connections
                .set_state(&survivor, ConnectionState::WaitingForPeer);
            self.notify(&survivor, SignalMessage::PeerLeft).await;
        }

        Some(departure)
    }

    async fn notify(&self, target: &ConnectionId, msg: SignalMessage) {
        let kind = msg.kind();
        if let Err(e) = self.output.send_signal(target, msg).await {
            warn!("Could not deliver {} to {}: {}", kind, target, e);
        }
    }
}

use heapless::Vec as BoundedVec;
use std::time::Instant;
use stranger_core::{ConnectionId, RoomId};

/// A call is always between two participants.
pub const ROOM_CAPACITY: usize = 2;

/// Pairing unit. Occupants are kept in join order and the storage cannot hold
/// more than [`ROOM_CAPACITY`] entries.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    occupants: BoundedVec<ConnectionId, ROOM_CAPACITY>,
    created_at: Instant,
}

impl Room {
    pub(crate) fn new(id: RoomId, first: ConnectionId) -> Self {
        let mut occupants = BoundedVec::new();
        // An empty vector always has room for one.
        let _ = occupants.push(first);

        Self {
            id,
            occupants,
            created_at: Instant::now(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn occupants(&self) -> &[ConnectionId] {
        &self.occupants
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.occupants.len() >= ROOM_CAPACITY
    }

    /// Exactly one participant waiting for a partner.
    pub fn is_waiting(&self) -> bool {
        self.occupants.len() == 1
    }

    pub fn contains(&self, occupant: &ConnectionId) -> bool {
        self.occupants.contains(occupant)
    }

    /// The occupant other than `occupant`, if any.
    pub fn peer_of(&self, occupant: &ConnectionId) -> Option<ConnectionId> {
        self.occupants.iter().find(|id| *id != occupant).copied()
    }

    /// Appends `occupant`, giving it back when both slots are taken.
    pub(crate) fn admit(&mut self, occupant: ConnectionId) -> Result<(), ConnectionId> {
        self.occupants.push(occupant)
    }

    pub(crate) fn remove(&mut self, occupant: &ConnectionId) -> bool {
        let before = self.occupants.len();
        self.occupants.retain(|id| id != occupant);
        self.occupants.len() != before
    }
}

use crate::config::PairingPolicy;
use crate::error::RegistryError;
use crate::registry::room::Room;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use stranger_core::{ConnectionId, RoomId};
use tracing::{debug, info};

/// Result of removing an occupant from its room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub room_id: RoomId,
    /// The occupant still in the room, to be told its peer is gone.
    pub remaining: Option<ConnectionId>,
}

/// Owns every room. Each room's occupant list is only mutated while holding the
/// write lock of the map shard it lives in, so a join, a leave and a room's
/// destruction are each a single critical section for that room.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<RoomId, Room>,
    occupancy: DashMap<ConnectionId, RoomId>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks a room `join` may succeed against.
    ///
    /// A requested room with a free slot always wins. Failing that, random
    /// pairing offers the longest-waiting single-occupant room. The answer is a
    /// snapshot: the room may fill up before the caller joins it.
    pub fn find_pairable_room(
        &self,
        requested: Option<&RoomId>,
        policy: PairingPolicy,
    ) -> Option<RoomId> {
        if let Some(id) = requested {
            let free = self.rooms.get(id).is_some_and(|room| !room.is_full());
            if free {
                return Some(id.clone());
            }
        }

        match policy {
            PairingPolicy::Explicit => None,
            PairingPolicy::Random => self
                .rooms
                .iter()
                .filter(|entry| entry.value().is_waiting())
                .min_by_key(|entry| entry.value().created_at())
                .map(|entry| entry.key().clone()),
        }
    }

    pub fn create_room(&self, id: RoomId, first: ConnectionId) -> Result<RoomId, RegistryError> {
        match self.rooms.entry(id.clone()) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateRoom(id)),
            Entry::Vacant(slot) => {
                slot.insert(Room::new(id.clone(), first));
                self.occupancy.insert(first, id.clone());
                info!("Room {} created by {}", id, first);
                Ok(id)
            }
        }
    }

    /// Adds `occupant` to the room. Returns the other occupant once the room is
    /// full, `None` if `occupant` is alone in it.
    pub fn join(
        &self,
        room_id: &RoomId,
        occupant: ConnectionId,
    ) -> Result<Option<ConnectionId>, RegistryError> {
        let Some(mut room) = self.rooms.get_mut(room_id) else {
            return Err(RegistryError::UnknownRoom(room_id.clone()));
        };

        if room.admit(occupant).is_err() {
            debug!("{} lost the race for room {}", occupant, room_id);
            return Err(RegistryError::RoomFull(room_id.clone()));
        }

        self.occupancy.insert(occupant, room_id.clone());
        let peer = room.peer_of(&occupant);
        info!("{} joined room {} ({} occupants)", occupant, room_id, room.len());

        Ok(peer)
    }

    /// Removes `occupant` from its room and destroys the room if it is left empty.
    pub fn leave(&self, occupant: &ConnectionId) -> Option<Departure> {
        let (_, room_id) = self.occupancy.remove(occupant)?;

        let mut remaining = None;
        let destroyed = self
            .rooms
            .remove_if_mut(&room_id, |_, room| {
                room.remove(occupant);
                remaining = room.occupants().first().copied();
                room.is_empty()
            })
            .is_some();

        if destroyed {
            info!("Room {} destroyed", room_id);
        } else {
            info!("{} left room {}", occupant, room_id);
        }

        Some(Departure { room_id, remaining })
    }

    pub fn room(&self, id: &RoomId) -> Option<Room> {
        self.rooms.get(id).map(|room| room.clone())
    }

    pub fn room_of(&self, occupant: &ConnectionId) -> Option<RoomId> {
        self.occupancy.get(occupant).map(|id| id.clone())
    }

    pub fn rooms(&self) -> Vec<Room> {
        self.rooms.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

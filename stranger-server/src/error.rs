use stranger_core::{ConnectionId, ErrorCode, RoomId};
use thiserror::Error;

/// Failures of room table mutations. None of them is fatal: the caller either
/// retries against another room or reports back to the requesting client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The second slot was taken by a concurrent join.
    #[error("room {0} already has two occupants")]
    RoomFull(RoomId),

    /// An explicit room id is already in use.
    #[error("room {0} already exists")]
    DuplicateRoom(RoomId),

    /// The room was destroyed between lookup and join.
    #[error("room {0} does not exist")]
    UnknownRoom(RoomId),
}

impl RegistryError {
    /// Whether another pairing attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RoomFull(_) | Self::UnknownRoom(_))
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::DuplicateRoom(_) => ErrorCode::DuplicateRoom,
            Self::RoomFull(_) | Self::UnknownRoom(_) => ErrorCode::JoinFailed,
        }
    }
}

#[derive(Error, Debug)]
pub enum SignalingError {
    /// Target is not registered or its outbound channel is already closed.
    #[error("connection {0} is not connected")]
    UnknownTarget(ConnectionId),

    #[error("failed to serialize signal: {0}")]
    Serialize(#[from] serde_json::Error),
}

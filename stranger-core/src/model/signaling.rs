use crate::model::connection::ConnectionId;
use crate::model::room::RoomId;
use crate::model::session::{IceCandidate, SessionDescription};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    DuplicateRoom,
    JoinFailed,
    InvalidMessage,
}

/// Envelope exchanged between a connection and the signaling server.
///
/// `offer`, `answer` and `ice-candidate` are relayed to `target` unchanged;
/// every other kind is either a request to the server or a server notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum SignalMessage {
    Join {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<RoomId>,
    },
    Welcome {
        connection_id: ConnectionId,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    Waiting {
        room_id: RoomId,
    },
    PeerIdentity {
        peer_connection_id: ConnectionId,
        is_initiator: bool,
    },
    Offer {
        target: ConnectionId,
        #[serde(alias = "caller")]
        from: ConnectionId,
        sdp: SessionDescription,
    },
    Answer {
        target: ConnectionId,
        #[serde(alias = "caller")]
        from: ConnectionId,
        sdp: SessionDescription,
    },
    IceCandidate {
        target: ConnectionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<ConnectionId>,
        candidate: IceCandidate,
    },
    Leave,
    PeerLeft,
    Error {
        code: ErrorCode,
        message: String,
    },
}

impl SignalMessage {
    /// Destination of a relayable message, `None` for everything else.
    pub fn target(&self) -> Option<&ConnectionId> {
        match self {
            SignalMessage::Offer { target, .. }
            | SignalMessage::Answer { target, .. }
            | SignalMessage::IceCandidate { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SignalMessage::Join { .. } => "join",
            SignalMessage::Welcome { .. } => "welcome",
            SignalMessage::IceConfig { .. } => "ice-config",
            SignalMessage::Waiting { .. } => "waiting",
            SignalMessage::PeerIdentity { .. } => "peer-identity",
            SignalMessage::Offer { .. } => "offer",
            SignalMessage::Answer { .. } => "answer",
            SignalMessage::IceCandidate { .. } => "ice-candidate",
            SignalMessage::Leave => "leave",
            SignalMessage::PeerLeft => "peer-left",
            SignalMessage::Error { .. } => "error",
        }
    }
}

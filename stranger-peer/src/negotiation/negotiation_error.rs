use crate::negotiation::{NegotiationState, Role};
use stranger_core::ConnectionId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("{event} is not valid for a {role:?} in {state:?}")]
    InvalidState {
        event: &'static str,
        role: Role,
        state: NegotiationState,
    },

    #[error("answer from {got} but the offer went to {expected}")]
    UnexpectedSender {
        expected: ConnectionId,
        got: ConnectionId,
    },

    #[error("peer connection failed: {0:#}")]
    Peer(anyhow::Error),

    #[error("signaling channel unavailable: {0:#}")]
    Signal(anyhow::Error),

    #[error("negotiation session is closed")]
    Closed,
}

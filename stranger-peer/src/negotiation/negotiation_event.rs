use stranger_core::{ConnectionId, IceCandidate, SessionDescription};

/// Inputs that drive a [`NegotiationCoordinator`](crate::NegotiationCoordinator).
#[derive(Debug, Clone, PartialEq)]
pub enum NegotiationEvent {
    /// Local media is ready and the caller should start a round.
    NegotiationNeeded,
    RemoteOffer {
        from: ConnectionId,
        sdp: SessionDescription,
    },
    RemoteAnswer {
        from: ConnectionId,
        sdp: SessionDescription,
    },
    RemoteCandidate(IceCandidate),
    /// Gathered by the local peer connection; goes out over signaling.
    LocalCandidate(IceCandidate),
    /// Tracks changed on a stable session.
    Renegotiate,
    PeerLeft,
}

impl NegotiationEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            NegotiationEvent::NegotiationNeeded => "negotiation-needed",
            NegotiationEvent::RemoteOffer { .. } => "remote-offer",
            NegotiationEvent::RemoteAnswer { .. } => "remote-answer",
            NegotiationEvent::RemoteCandidate(_) => "remote-candidate",
            NegotiationEvent::LocalCandidate(_) => "local-candidate",
            NegotiationEvent::Renegotiate => "renegotiate",
            NegotiationEvent::PeerLeft => "peer-left",
        }
    }
}

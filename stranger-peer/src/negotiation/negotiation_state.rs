/// Offer/answer progress of one peer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegotiationState {
    #[default]
    Idle,
    HaveLocalOffer,
    HaveRemoteOffer,
    HaveLocalAnswer,
    HaveRemoteAnswer,
    Stable,
}

/// Which side of the pair produces the offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Caller,
    Callee,
}

impl Role {
    pub fn from_initiator(is_initiator: bool) -> Self {
        if is_initiator { Role::Caller } else { Role::Callee }
    }
}

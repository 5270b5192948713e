use crate::negotiation::{NegotiationError, NegotiationEvent, NegotiationState, Role};
use crate::peer::{PeerConnection, SignalSink};
use std::collections::VecDeque;
use std::sync::Arc;
use stranger_core::{ConnectionId, IceCandidate, SessionDescription, SignalMessage};
use tracing::{debug, info, warn};

/// Drives one offer/answer session with the paired peer.
///
/// The caller offers, the callee answers. Remote candidates that arrive before
/// the remote description are held and applied in receipt order once it is set.
/// A step that fails rolls the session back to where it was before the event
/// and sends nothing further.
pub struct NegotiationCoordinator {
    local_id: ConnectionId,
    peer_id: ConnectionId,
    role: Role,
    state: NegotiationState,
    #[cfg(any(test, feature = "test-util"))]
    history: Vec<NegotiationState>,
    local_description: Option<SessionDescription>,
    remote_description: Option<SessionDescription>,
    pending_candidates: VecDeque<IceCandidate>,
    peer: Arc<dyn PeerConnection>,
    signals: Arc<dyn SignalSink>,
    closed: bool,
}

/// Session state as it was before an event, restored if the event fails.
struct Checkpoint {
    state: NegotiationState,
    local_description: Option<SessionDescription>,
    remote_description: Option<SessionDescription>,
    pending_candidates: VecDeque<IceCandidate>,
}

impl NegotiationCoordinator {
    pub fn new(
        local_id: ConnectionId,
        peer_id: ConnectionId,
        role: Role,
        peer: Arc<dyn PeerConnection>,
        signals: Arc<dyn SignalSink>,
    ) -> Self {
        Self {
            local_id,
            peer_id,
            role,
            state: NegotiationState::Idle,
            #[cfg(any(test, feature = "test-util"))]
            history: vec![NegotiationState::Idle],
            local_description: None,
            remote_description: None,
            pending_candidates: VecDeque::new(),
            peer,
            signals,
            closed: false,
        }
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    /// Every state entered so far, oldest first.
    #[cfg(any(test, feature = "test-util"))]
    pub fn history(&self) -> &[NegotiationState] {
        &self.history
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn peer_id(&self) -> ConnectionId {
        self.peer_id
    }

    pub fn local_description(&self) -> Option<&SessionDescription> {
        self.local_description.as_ref()
    }

    pub fn remote_description(&self) -> Option<&SessionDescription> {
        self.remote_description.as_ref()
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub async fn handle(&mut self, event: NegotiationEvent) -> Result<(), NegotiationError> {
        if self.closed {
            return Err(NegotiationError::Closed);
        }

        let checkpoint = self.checkpoint();
        let result = match event {
            NegotiationEvent::NegotiationNeeded => self.start_offer().await,
            NegotiationEvent::RemoteOffer { from, sdp } => self.accept_offer(from, sdp).await,
            NegotiationEvent::RemoteAnswer { from, sdp } => self.accept_answer(from, sdp).await,
            NegotiationEvent::RemoteCandidate(candidate) => {
                self.add_remote_candidate(candidate).await
            }
            NegotiationEvent::LocalCandidate(candidate) => self.send(SignalMessage::IceCandidate {
                target: self.peer_id,
                from: Some(self.local_id),
                candidate,
            }),
            NegotiationEvent::Renegotiate => self.renegotiate().await,
            NegotiationEvent::PeerLeft => {
                self.teardown().await;
                Ok(())
            }
        };

        if result.is_err() && !self.closed {
            self.restore(checkpoint);
        }
        result
    }

    async fn start_offer(&mut self) -> Result<(), NegotiationError> {
        if self.role != Role::Caller || self.state != NegotiationState::Idle {
            debug!(
                "Ignoring negotiation-needed as {:?} in {:?}",
                self.role, self.state
            );
            return Ok(());
        }

        let offer = self
            .peer
            .create_offer()
            .await
            .map_err(NegotiationError::Peer)?;
        self.peer
            .set_local_description(offer.clone())
            .await
            .map_err(NegotiationError::Peer)?;

        self.local_description = Some(offer.clone());
        self.transition(NegotiationState::HaveLocalOffer);

        info!("Sending offer to {}", self.peer_id);
        self.send(SignalMessage::Offer {
            target: self.peer_id,
            from: self.local_id,
            sdp: offer,
        })
    }

    async fn accept_offer(
        &mut self,
        from: ConnectionId,
        sdp: SessionDescription,
    ) -> Result<(), NegotiationError> {
        if self.role != Role::Callee
            || !matches!(
                self.state,
                NegotiationState::Idle | NegotiationState::Stable
            )
        {
            return Err(self.invalid("remote-offer"));
        }
        if from != self.peer_id {
            return Err(NegotiationError::UnexpectedSender {
                expected: self.peer_id,
                got: from,
            });
        }

        self.peer
            .set_remote_description(sdp.clone())
            .await
            .map_err(NegotiationError::Peer)?;
        self.remote_description = Some(sdp);
        self.local_description = None;
        self.transition(NegotiationState::HaveRemoteOffer);
        self.flush_pending_candidates().await;

        self.peer
            .add_local_tracks()
            .await
            .map_err(NegotiationError::Peer)?;
        let answer = self
            .peer
            .create_answer()
            .await
            .map_err(NegotiationError::Peer)?;
        self.peer
            .set_local_description(answer.clone())
            .await
            .map_err(NegotiationError::Peer)?;
        self.local_description = Some(answer.clone());
        self.transition(NegotiationState::HaveLocalAnswer);

        info!("Sending answer to {}", from);
        self.send(SignalMessage::Answer {
            target: from,
            from: self.local_id,
            sdp: answer,
        })?;
        self.transition(NegotiationState::Stable);
        Ok(())
    }

    async fn accept_answer(
        &mut self,
        from: ConnectionId,
        sdp: SessionDescription,
    ) -> Result<(), NegotiationError> {
        if self.role != Role::Caller || self.state != NegotiationState::HaveLocalOffer {
            return Err(self.invalid("remote-answer"));
        }
        if from != self.peer_id {
            return Err(NegotiationError::UnexpectedSender {
                expected: self.peer_id,
                got: from,
            });
        }

        self.peer
            .set_remote_description(sdp.clone())
            .await
            .map_err(NegotiationError::Peer)?;
        self.remote_description = Some(sdp);
        self.transition(NegotiationState::HaveRemoteAnswer);
        self.flush_pending_candidates().await;
        self.transition(NegotiationState::Stable);
        Ok(())
    }

    async fn add_remote_candidate(&mut self, candidate: IceCandidate) -> Result<(), NegotiationError> {
        if self.remote_description.is_none() {
            debug!(
                "Queueing remote candidate until the remote description is set ({} pending)",
                self.pending_candidates.len() + 1
            );
            self.pending_candidates.push_back(candidate);
            return Ok(());
        }

        self.peer
            .add_ice_candidate(candidate)
            .await
            .map_err(NegotiationError::Peer)
    }

    async fn flush_pending_candidates(&mut self) {
        while let Some(candidate) = self.pending_candidates.pop_front() {
            if let Err(e) = self.peer.add_ice_candidate(candidate).await {
                warn!("Failed to apply queued ICE candidate: {:#}", e);
            }
        }
    }

    /// Starts a new round from any state. Only the caller offers, so a callee
    /// keeps its session and waits for the caller's next offer.
    async fn renegotiate(&mut self) -> Result<(), NegotiationError> {
        if self.role != Role::Caller {
            debug!("Ignoring renegotiate as Callee in {:?}", self.state);
            return Ok(());
        }

        self.local_description = None;
        self.remote_description = None;
        if self.state != NegotiationState::Idle {
            self.transition(NegotiationState::Idle);
        }
        self.start_offer().await
    }

    async fn teardown(&mut self) {
        if let Err(e) = self.peer.close().await {
            warn!("Failed to close peer connection: {:#}", e);
        }
        self.local_description = None;
        self.remote_description = None;
        self.pending_candidates.clear();
        self.transition(NegotiationState::Idle);
        self.closed = true;
        info!("Negotiation with {} closed", self.peer_id);
    }

    fn send(&self, msg: SignalMessage) -> Result<(), NegotiationError> {
        self.signals
            .send_signal(msg)
            .map_err(NegotiationError::Signal)
    }

    fn transition(&mut self, next: NegotiationState) {
        debug!("Negotiation {:?} -> {:?}", self.state, next);
        self.state = next;
        #[cfg(any(test, feature = "test-util"))]
        self.history.push(next);
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            state: self.state,
            local_description: self.local_description.clone(),
            remote_description: self.remote_description.clone(),
            pending_candidates: self.pending_candidates.clone(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        if self.state != checkpoint.state {
            debug!("Rolling negotiation back to {:?}", checkpoint.state);
            self.transition(checkpoint.state);
        }
        self.local_description = checkpoint.local_description;
        self.remote_description = checkpoint.remote_description;
        self.pending_candidates = checkpoint.pending_candidates;
    }

    fn invalid(&self, event: &'static str) -> NegotiationError {
        NegotiationError::InvalidState {
            event,
            role: self.role,
            state: self.state,
        }
    }
}

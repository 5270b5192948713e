//! In-memory stand-ins for the WebRTC stack and the signaling socket.

use crate::negotiation::NegotiationEvent;
use crate::peer::{PeerConnection, PeerConnectionFactory, SignalSink};
use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use stranger_core::{IceCandidate, IceServerConfig, SdpType, SessionDescription, SignalMessage};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerCall {
    CreateOffer,
    CreateAnswer,
    SetLocal(SdpType),
    SetRemote(SdpType),
    AddCandidate(String),
    AddLocalTracks,
    Close,
}

/// Records every call; descriptions are synthetic and numbered.
#[derive(Default)]
pub struct RecordingPeer {
    calls: Mutex<Vec<PeerCall>>,
    descriptions: AtomicUsize,
    reject_remote: AtomicBool,
    reject_answers: AtomicBool,
}

impl RecordingPeer {
    pub fn calls(&self) -> Vec<PeerCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Makes every later `set_remote_description` fail.
    pub fn fail_remote_descriptions(&self) {
        self.reject_remote.store(true, Ordering::SeqCst);
    }

    /// Makes `create_answer` fail until called again with `false`.
    pub fn fail_answers(&self, fail: bool) {
        self.reject_answers.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: PeerCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn next_sdp(&self, label: &str) -> String {
        let n = self.descriptions.fetch_add(1, Ordering::SeqCst) + 1;
        format!("v=0 {label}-{n}")
    }
}

#[async_trait]
impl PeerConnection for RecordingPeer {
    async fn create_offer(&self) -> Result<SessionDescription> {
        self.record(PeerCall::CreateOffer);
        Ok(SessionDescription::offer(self.next_sdp("offer")))
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        self.record(PeerCall::CreateAnswer);
        if self.reject_answers.load(Ordering::SeqCst) {
            bail!("answer could not be created");
        }
        Ok(SessionDescription::answer(self.next_sdp("answer")))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()> {
        self.record(PeerCall::SetLocal(desc.sdp_type));
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()> {
        if self.reject_remote.load(Ordering::SeqCst) {
            bail!("remote description rejected: {}", desc.sdp);
        }
        self.record(PeerCall::SetRemote(desc.sdp_type));
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        self.record(PeerCall::AddCandidate(candidate.candidate));
        Ok(())
    }

    async fn add_local_tracks(&self) -> Result<()> {
        self.record(PeerCall::AddLocalTracks);
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.record(PeerCall::Close);
        Ok(())
    }
}

/// Hands out [`RecordingPeer`]s and keeps them for inspection.
#[derive(Default)]
pub struct RecordingPeerFactory {
    created: Mutex<Vec<Arc<RecordingPeer>>>,
}

impl RecordingPeerFactory {
    pub fn created(&self) -> Vec<Arc<RecordingPeer>> {
        self.created.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<Arc<RecordingPeer>> {
        self.created().pop()
    }
}

#[async_trait]
impl PeerConnectionFactory for RecordingPeerFactory {
    async fn create(
        &self,
        _ice_servers: &[IceServerConfig],
        _events: mpsc::UnboundedSender<NegotiationEvent>,
    ) -> Result<Arc<dyn PeerConnection>> {
        let peer = Arc::new(RecordingPeer::default());
        if let Ok(mut created) = self.created.lock() {
            created.push(peer.clone());
        }
        Ok(peer)
    }
}

/// Collects outbound signaling messages.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<SignalMessage>>,
    closed: AtomicBool,
}

impl RecordingSink {
    pub fn sent(&self) -> Vec<SignalMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Makes sends fail until called again with `false`.
    pub fn fail_sends(&self, fail: bool) {
        self.closed.store(fail, Ordering::SeqCst);
    }
}

impl SignalSink for RecordingSink {
    fn send_signal(&self, msg: SignalMessage) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            bail!("signaling channel closed");
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(msg);
        }
        Ok(())
    }
}

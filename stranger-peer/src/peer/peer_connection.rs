use crate::negotiation::NegotiationEvent;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use stranger_core::{IceCandidate, IceServerConfig, SessionDescription};
use tokio::sync::mpsc;

/// The slice of a WebRTC peer connection that negotiation drives.
#[async_trait]
pub trait PeerConnection: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription>;

    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    /// Attaches local media. Calling it again is a no-op.
    async fn add_local_tracks(&self) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// Builds a fresh peer connection for each pairing.
///
/// Gathered candidates are reported on `events` as
/// [`NegotiationEvent::LocalCandidate`].
#[async_trait]
pub trait PeerConnectionFactory: Send + Sync {
    async fn create(
        &self,
        ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<NegotiationEvent>,
    ) -> Result<Arc<dyn PeerConnection>>;
}

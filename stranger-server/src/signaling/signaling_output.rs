use crate::error::SignalingError;
use async_trait::async_trait;
use stranger_core::{ConnectionId, SignalMessage};

/// Delivery of server-originated and relayed messages to a connection.
/// Implemented by the connection registry; tests substitute a recorder.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Queue `msg` for `target` without waiting for it to be written.
    async fn send_signal(
        &self,
        target: &ConnectionId,
        msg: SignalMessage,
    ) -> Result<(), SignalingError>;
}

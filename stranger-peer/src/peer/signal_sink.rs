use anyhow::{Result, anyhow};
use stranger_core::SignalMessage;
use tokio::sync::mpsc;

/// Outbound half of the signaling connection.
pub trait SignalSink: Send + Sync {
    fn send_signal(&self, msg: SignalMessage) -> Result<()>;
}

impl SignalSink for mpsc::UnboundedSender<SignalMessage> {
    fn send_signal(&self, msg: SignalMessage) -> Result<()> {
        self.send(msg)
            .map_err(|e| anyhow!("signaling channel closed, dropped {}", e.0.kind()))
    }
}

/// Where a connection is in its lifecycle.
///
/// `Connecting -> Joined -> (Paired | WaitingForPeer) -> Left`. A paired
/// connection whose peer leaves drops back to `WaitingForPeer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Joined,
    WaitingForPeer,
    Paired,
    Left,
}

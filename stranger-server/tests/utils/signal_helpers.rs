use anyhow::{Context, Result, bail};
use stranger_core::{ConnectionId, RoomId, SignalMessage};
use stranger_server::SignalingService;

use super::test_client::TestClient;

/// Timeout for a single expected signal (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 2000;

/// How long a client must stay silent to count as "nothing received" (ms).
pub const QUIET_PERIOD_MS: u64 = 100;

/// Connects two clients and seats them together in `room`.
///
/// The first client waits in the room, the second completes the pair. Both
/// `peer-identity` notifications are consumed and returned as
/// `(peer, is_initiator)` for the first and second client.
pub async fn pair_clients(
    service: &SignalingService,
    room: &str,
) -> Result<(TestClient, TestClient, (ConnectionId, bool), (ConnectionId, bool))> {
    let mut first = TestClient::connect(service)
        .await
        .context("first client greeting")?;
    first.join(Some(room)).await;
    match first.recv().await? {
        SignalMessage::Waiting { room_id } if room_id == RoomId::from(room) => {}
        other => bail!("expected waiting in {}, got {:?}", room, other),
    }

    let mut second = TestClient::connect(service)
        .await
        .context("second client greeting")?;
    second.join(Some(room)).await;

    let first_identity = expect_peer_identity(&mut first).await?;
    let second_identity = expect_peer_identity(&mut second).await?;

    Ok((first, second, first_identity, second_identity))
}

pub async fn expect_peer_identity(client: &mut TestClient) -> Result<(ConnectionId, bool)> {
    match client.recv().await? {
        SignalMessage::PeerIdentity {
            peer_connection_id,
            is_initiator,
        } => Ok((peer_connection_id, is_initiator)),
        other => bail!("{} expected peer-identity, got {:?}", client.id, other),
    }
}

use std::sync::Arc;
use stranger_core::{ConnectionId, IceCandidate, RoomId, SessionDescription, SignalMessage};
use stranger_server::{Delivery, PairingPolicy, SignalingRelay};

use crate::integration::{create_test_service, init_tracing};
use crate::utils::{MockSignalingOutput, pair_clients};

#[tokio::test]
async fn test_relay_to_disconnected_peer_is_dropped_quietly() {
    init_tracing();

    let service = create_test_service(PairingPolicy::Random);
    let (mut a, b, _, _) = pair_clients(&service, "one")
        .await
        .expect("Pairing failed");
    let (c, mut d, _, _) = pair_clients(&service, "two")
        .await
        .expect("Pairing failed");

    b.disconnect().await;
    assert_eq!(a.recv().await.expect("a not notified"), SignalMessage::PeerLeft);

    let stale = SignalMessage::Offer {
        target: b.id,
        from: a.id,
        sdp: SessionDescription::offer("v=0"),
    };
    assert!(a.send(stale).await.is_continue());
    assert!(service.connections().is_live(&a.id));
    a.expect_silence().await.expect("Sender should not hear back");

    let offer = SignalMessage::Offer {
        target: d.id,
        from: c.id,
        sdp: SessionDescription::offer("v=0 other room"),
    };
    c.send(offer.clone()).await;
    assert_eq!(d.recv().await.expect("Offer not relayed"), offer);

    let other = service
        .rooms()
        .room(&RoomId::from("two"))
        .expect("Room two should be intact");
    assert_eq!(other.occupants(), &[c.id, d.id]);
}

#[tokio::test]
async fn test_relay_reports_dropped_for_unreachable_target() {
    init_tracing();

    let signaling = MockSignalingOutput::new_stored_only();
    let relay = SignalingRelay::new(Arc::new(signaling.clone()));
    let sender = ConnectionId::new();
    let gone = ConnectionId::new();
    let live = ConnectionId::new();
    signaling.mark_unreachable(gone).await;

    let to_gone = SignalMessage::IceCandidate {
        target: gone,
        from: Some(sender),
        candidate: IceCandidate::new("candidate:1"),
    };
    let to_live = SignalMessage::IceCandidate {
        target: live,
        from: Some(sender),
        candidate: IceCandidate::new("candidate:2"),
    };

    assert_eq!(relay.forward(&sender, to_gone).await, Delivery::Dropped);
    assert_eq!(relay.forward(&sender, to_live.clone()).await, Delivery::Delivered);
    assert_eq!(relay.forward(&sender, SignalMessage::Leave).await, Delivery::Dropped);

    assert_eq!(signaling.sent_to(&live).await, vec![to_live]);
    assert_eq!(signaling.count().await, 1);
}

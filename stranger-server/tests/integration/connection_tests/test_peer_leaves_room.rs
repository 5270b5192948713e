use stranger_core::{RoomId, SignalMessage};
use stranger_server::{ConnectionState, PairingPolicy};

use crate::integration::{create_test_service, init_tracing};
use crate::utils::{TestClient, expect_peer_identity, pair_clients};

#[tokio::test]
async fn test_disconnect_while_paired_notifies_survivor() {
    init_tracing();

    let service = create_test_service(PairingPolicy::Explicit);
    let (mut a, mut b, _, _) = pair_clients(&service, "abc")
        .await
        .expect("Pairing failed");

    a.disconnect().await;

    assert_eq!(b.recv().await.expect("b not notified"), SignalMessage::PeerLeft);
    assert_eq!(
        service.lifecycle().state(&b.id),
        Some(ConnectionState::WaitingForPeer)
    );
    assert_eq!(service.lifecycle().state(&a.id), None);
    assert!(!service.connections().is_live(&a.id));

    let room = service
        .rooms()
        .room(&RoomId::from("abc"))
        .expect("Room abc should survive with one occupant");
    assert_eq!(room.occupants(), &[b.id]);

    a.expect_closed().await.expect("a should be closed");
}

#[tokio::test]
async fn test_room_abc_is_recreated_after_both_depart() {
    init_tracing();

    let service = create_test_service(PairingPolicy::Explicit);
    let (a, mut b, _, _) = pair_clients(&service, "abc")
        .await
        .expect("Pairing failed");

    a.disconnect().await;
    assert_eq!(b.recv().await.expect("b not notified"), SignalMessage::PeerLeft);
    b.disconnect().await;

    assert!(service.rooms().room(&RoomId::from("abc")).is_none());
    assert!(service.rooms().is_empty());

    let mut c = TestClient::connect(&service)
        .await
        .expect("Failed to connect test client");
    c.join(Some("abc")).await;

    assert_eq!(
        c.recv().await.expect("No reply to join"),
        SignalMessage::Waiting {
            room_id: RoomId::from("abc")
        }
    );
    let room = service
        .rooms()
        .room(&RoomId::from("abc"))
        .expect("Room abc should exist again");
    assert_eq!(room.occupants(), &[c.id]);
}

#[tokio::test]
async fn test_survivor_is_paired_with_next_joiner() {
    init_tracing();

    let service = create_test_service(PairingPolicy::Explicit);
    let (a, mut b, _, _) = pair_clients(&service, "abc")
        .await
        .expect("Pairing failed");

    a.disconnect().await;
    assert_eq!(b.recv().await.expect("b not notified"), SignalMessage::PeerLeft);

    let mut c = TestClient::connect(&service)
        .await
        .expect("Failed to connect test client");
    c.join(Some("abc")).await;

    assert_eq!(
        expect_peer_identity(&mut b).await.expect("b not paired"),
        (c.id, true)
    );
    assert_eq!(
        expect_peer_identity(&mut c).await.expect("c not paired"),
        (b.id, false)
    );
}

#[tokio::test]
async fn test_explicit_leave_closes_connection_once() {
    init_tracing();

    let service = create_test_service(PairingPolicy::Explicit);
    let (mut a, mut b, _, _) = pair_clients(&service, "abc")
        .await
        .expect("Pairing failed");

    assert!(a.leave().await.is_break());
    assert_eq!(b.recv().await.expect("b not notified"), SignalMessage::PeerLeft);
    a.expect_closed().await.expect("a should be closed");

    // The socket closing afterwards must not notify anyone again.
    a.disconnect().await;
    b.expect_silence().await.expect("b notified twice");
    assert_eq!(service.connections().len(), 1);
}

#[tokio::test]
async fn test_leaving_single_occupant_room_destroys_it() {
    init_tracing();

    let service = create_test_service(PairingPolicy::Explicit);
    let mut a = TestClient::connect(&service)
        .await
        .expect("Failed to connect test client");
    a.join(Some("solo")).await;
    assert!(matches!(
        a.recv().await.expect("No reply to join"),
        SignalMessage::Waiting { .. }
    ));

    a.disconnect().await;

    assert!(service.rooms().is_empty());
    assert!(service.connections().is_empty());
}

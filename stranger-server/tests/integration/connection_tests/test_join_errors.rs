use stranger_core::{ErrorCode, RoomId, SignalMessage};
use stranger_server::{ConnectionState, PairingPolicy};

use crate::integration::{create_test_service, init_tracing};
use crate::utils::{TestClient, pair_clients};

#[tokio::test]
async fn test_third_joiner_of_named_room_is_refused() {
    init_tracing();

    let service = create_test_service(PairingPolicy::Explicit);
    let (mut a, mut b, _, _) = pair_clients(&service, "abc")
        .await
        .expect("Pairing failed");

    let mut c = TestClient::connect(&service)
        .await
        .expect("Failed to connect test client");
    assert!(c.join(Some("abc")).await.is_continue());

    match c.recv().await.expect("No reply to join") {
        SignalMessage::Error { code, .. } => assert_eq!(code, ErrorCode::DuplicateRoom),
        other => panic!("expected an error, got {:?}", other),
    }
    assert_eq!(
        service.lifecycle().state(&c.id),
        Some(ConnectionState::Connecting)
    );

    let room = service
        .rooms()
        .room(&RoomId::from("abc"))
        .expect("Room abc should exist");
    assert_eq!(room.occupants(), &[a.id, b.id]);
    assert_eq!(service.rooms().room_of(&c.id), None);

    a.expect_silence().await.expect("a should not be notified");
    b.expect_silence().await.expect("b should not be notified");
}

#[tokio::test]
async fn test_random_pairing_routes_around_full_room() {
    init_tracing();

    let service = create_test_service(PairingPolicy::Random);
    let (_a, _b, _, _) = pair_clients(&service, "abc")
        .await
        .expect("Pairing failed");

    let mut c = TestClient::connect(&service)
        .await
        .expect("Failed to connect test client");
    c.join(Some("abc")).await;

    let room_id = match c.recv().await.expect("No reply to join") {
        SignalMessage::Waiting { room_id } => room_id,
        other => panic!("expected waiting, got {:?}", other),
    };
    assert_ne!(room_id, RoomId::from("abc"));
    assert_eq!(service.rooms().len(), 2);
    assert_eq!(
        service
            .rooms()
            .room(&RoomId::from("abc"))
            .map(|room| room.len()),
        Some(2)
    );
}

use std::collections::HashMap;
use stranger_core::{ConnectionId, ErrorCode, RoomId, SignalMessage};
use stranger_server::PairingPolicy;

use crate::integration::{create_test_service, init_tracing};
use crate::utils::TestClient;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_random_joins_pair_everyone() {
    init_tracing();

    const CLIENTS: usize = 40;

    let service = create_test_service(PairingPolicy::Random);
    let mut clients = Vec::with_capacity(CLIENTS);
    for _ in 0..CLIENTS {
        clients.push(
            TestClient::connect(&service)
                .await
                .expect("Failed to connect test client"),
        );
    }

    let joins = clients.iter().map(|client| {
        let service = service.clone();
        let id = client.id;
        tokio::spawn(async move {
            service
                .dispatch(id, SignalMessage::Join { room_id: None })
                .await
        })
    });
    for join in futures::future::join_all(joins).await {
        assert!(join.expect("Join task panicked").is_continue());
    }

    let rooms = service.rooms().rooms();
    assert_eq!(rooms.len(), CLIENTS / 2);
    assert!(rooms.iter().all(|room| room.len() == 2));

    let mut identities: HashMap<ConnectionId, (ConnectionId, bool)> = HashMap::new();
    for client in clients.iter_mut() {
        loop {
            match client.recv().await.expect("Client was never paired") {
                SignalMessage::Waiting { .. } => continue,
                SignalMessage::PeerIdentity {
                    peer_connection_id,
                    is_initiator,
                } => {
                    identities.insert(client.id, (peer_connection_id, is_initiator));
                    break;
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    for (id, (peer, is_initiator)) in &identities {
        let (peer_of_peer, peer_is_initiator) = identities[peer];
        assert_eq!(peer_of_peer, *id);
        assert_ne!(*is_initiator, peer_is_initiator, "exactly one initiator per pair");
        assert_eq!(service.rooms().room_of(id), service.rooms().room_of(peer));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_joins_never_overfill_a_named_room() {
    init_tracing();

    const CLIENTS: usize = 8;

    let service = create_test_service(PairingPolicy::Explicit);
    let mut clients = Vec::with_capacity(CLIENTS);
    for _ in 0..CLIENTS {
        clients.push(
            TestClient::connect(&service)
                .await
                .expect("Failed to connect test client"),
        );
    }

    let joins = clients.iter().map(|client| {
        let service = service.clone();
        let id = client.id;
        tokio::spawn(async move {
            service
                .dispatch(
                    id,
                    SignalMessage::Join {
                        room_id: Some(RoomId::from("arena")),
                    },
                )
                .await
        })
    });
    futures::future::join_all(joins).await;

    let arena = service
        .rooms()
        .room(&RoomId::from("arena"))
        .expect("Arena should exist");
    assert_eq!(arena.len(), 2);
    assert_eq!(service.rooms().len(), 1);

    let mut refused = 0;
    for client in clients.iter_mut() {
        if let SignalMessage::Error { code, .. } = client.recv().await.expect("No reply to join") {
            assert_eq!(code, ErrorCode::DuplicateRoom);
            assert!(!arena.contains(&client.id));
            refused += 1;
        }
    }
    assert_eq!(refused, CLIENTS - 2);
}

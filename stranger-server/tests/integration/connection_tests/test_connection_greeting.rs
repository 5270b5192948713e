use stranger_core::{IceServerConfig, SignalMessage};
use stranger_server::{
    ConnectionState, DEFAULT_STUN_URL, PairingPolicy, SignalingConfig, SignalingService,
};

use crate::integration::{create_test_service, init_tracing};
use crate::utils::TestClient;

#[tokio::test]
async fn test_new_connection_is_greeted() {
    init_tracing();

    let service = create_test_service(PairingPolicy::Random);
    let client = TestClient::connect(&service)
        .await
        .expect("Failed to connect test client");

    assert_eq!(client.ice_servers.len(), 1);
    assert_eq!(client.ice_servers[0].urls, vec![DEFAULT_STUN_URL.to_string()]);
    assert_eq!(
        service.lifecycle().state(&client.id),
        Some(ConnectionState::Connecting)
    );
    assert!(service.connections().is_live(&client.id));
}

#[tokio::test]
async fn test_ice_config_carries_turn_credentials() {
    init_tracing();

    let turn = IceServerConfig {
        urls: vec!["turn:turn.example.org:3478".into()],
        username: Some("stranger".into()),
        credential: Some("s3cret".into()),
    };
    let mut config = SignalingConfig::default();
    config.ice_servers.push(turn.clone());
    let service = SignalingService::new(config);

    let client = TestClient::connect(&service)
        .await
        .expect("Failed to connect test client");

    assert_eq!(client.ice_servers.len(), 2);
    assert_eq!(client.ice_servers[1], turn);
}

#[tokio::test]
async fn test_server_bound_messages_from_clients_are_ignored() {
    init_tracing();

    let service = create_test_service(PairingPolicy::Random);
    let mut client = TestClient::connect(&service)
        .await
        .expect("Failed to connect test client");

    assert!(client.send(SignalMessage::PeerLeft).await.is_continue());
    assert!(
        client
            .send(SignalMessage::Welcome {
                connection_id: client.id
            })
            .await
            .is_continue()
    );

    client.expect_silence().await.expect("No reply expected");
    assert_eq!(
        service.lifecycle().state(&client.id),
        Some(ConnectionState::Connecting)
    );
}

use crate::error::SignalingError;
use crate::signaling::SignalingService;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use stranger_core::{ConnectionId, ErrorCode, SignalMessage};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service))
}

fn encode(msg: &SignalMessage) -> Result<Message, SignalingError> {
    Ok(Message::Text(serde_json::to_string(msg)?.into()))
}

async fn handle_socket(socket: WebSocket, service: SignalingService) {
    let connection_id = ConnectionId::new();
    info!("New WebSocket connection: {}", connection_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<SignalMessage>();

    service.lifecycle().connect(connection_id, tx).await;

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let frame = match encode(&msg) {
                Ok(frame) => frame,
                Err(e) => {
                    error!("Failed to encode {} for {}: {}", msg.kind(), connection_id, e);
                    continue;
                }
            };
            if sender.send(frame).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                let text = match msg {
                    Message::Text(text) => text,
                    Message::Close(_) => break,
                    _ => continue,
                };

                match serde_json::from_str::<SignalMessage>(text.as_str()) {
                    Ok(signal) => {
                        if service.dispatch(connection_id, signal).await.is_break() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Invalid SignalMessage from {}: {}", connection_id, e);
                        let reply = SignalMessage::Error {
                            code: ErrorCode::InvalidMessage,
                            message: e.to_string(),
                        };
                        let _ = service.connections().deliver(&connection_id, reply);
                    }
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.disconnect(&connection_id).await;
    info!("WebSocket disconnected: {}", connection_id);
}

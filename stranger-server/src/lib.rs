pub mod config;
pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod signaling;

pub use config::*;
pub use error::*;
pub use lifecycle::*;
pub use registry::*;
pub use signaling::*;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};

/// HTTP surface: the signaling WebSocket at `/ws` and a liveness probe.
pub fn router(service: SignalingService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(|| async { "ok" }))
        .layer(cors)
        .with_state(service)
}

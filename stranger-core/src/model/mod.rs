mod connection;
mod room;
mod session;
mod signaling;

pub use connection::ConnectionId;
pub use room::RoomId;
pub use session::{IceCandidate, SdpType, SessionDescription};
pub use signaling::{ErrorCode, IceServerConfig, SignalMessage};

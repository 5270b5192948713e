mod peer_connection;
mod rtc_peer;
mod signal_sink;

pub use peer_connection::*;
pub use rtc_peer::*;
pub use signal_sink::*;

mod connection_registry;
mod room;
mod room_registry;

pub use connection_registry::*;
pub use room::*;
pub use room_registry::*;

mod connection_state;
mod lifecycle_manager;

pub use connection_state::*;
pub use lifecycle_manager::*;

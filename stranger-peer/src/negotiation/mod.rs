mod negotiation_coordinator;
mod negotiation_error;
mod negotiation_event;
mod negotiation_state;

pub use negotiation_coordinator::*;
pub use negotiation_error::*;
pub use negotiation_event::*;
pub use negotiation_state::*;

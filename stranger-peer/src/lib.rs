pub mod engine;
pub mod negotiation;
pub mod peer;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use engine::*;
pub use negotiation::*;
pub use peer::*;

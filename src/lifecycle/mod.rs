//! Process wiring: tracing setup and the [`OrderSystem`] that runs the services.

pub mod order_system;
pub mod tracing;

pub use self::order_system::*;
pub use self::tracing::setup_tracing;

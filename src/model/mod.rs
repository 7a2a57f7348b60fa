//! Plain data types shared by the stores, the HTTP surfaces and the orchestrator.

pub mod order;
pub mod product;
pub mod user;

pub use order::*;
pub use product::*;
pub use user::*;

//! # order-saga
//!
//! Order placement spanning two services that cannot be locked together: a User directory
//! and a Product inventory. The Order service checks the user, snapshots the product and
//! then decrements stock with a token-gated `reserve`, so stock never goes negative and two
//! orders can never both succeed against the same stale snapshot.
//!
//! ## Core Components
//!
//! - **[wire]**: the flat JSON object format every body uses.
//! - **[directory]**: how the orchestrator calls the User and Product services.
//! - **[reservation]**: the token-gated reserve command, snapshots and the retry policy.
//! - **[orchestrator]**: the validate, confirm, snapshot, reserve state machine.
//! - **[http]**: `axum` routers for `/order`, `/user` and `/product`.
//! - **[user_actor]**, **[product_actor]**, **[clients]**: the collaborator stores, each a
//!   `store_actor::StoreActor` whose per-entity version doubles as the product token.
//! - **[lifecycle]**, **[config]**, **[workload]**: process wiring, `config.json` and the
//!   workload driver.
//!
//! ## Testing
//!
//! Orchestrator logic is tested against a scripted directory (`directory::mock`). The
//! `tests/` directory starts real services on `127.0.0.1:0` and drives them over HTTP.

pub mod clients;
pub mod config;
pub mod directory;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod orchestrator;
pub mod product_actor;
pub mod reservation;
pub mod user_actor;
pub mod wire;
pub mod workload;

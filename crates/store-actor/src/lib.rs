//! # Store Actor
//!
//! An in-memory, actor-owned entity store with per-entity versions.
//!
//! Each [`StoreActor`] runs in its own Tokio task and owns a map from id to
//! [`Versioned`] entity. All access goes through a cloneable [`StoreClient`] that sends
//! messages over a channel, so the map never needs a lock. Requests are handled one at a
//! time, which gives the store a compare-and-swap primitive for free:
//! [`StoreClient::perform_guarded_action`] applies an action only if the entity is still at
//! the version the caller observed, and advances the version in the same step.
//!
//! ## Layers
//!
//! 1. **Entity** ([`StoreEntity`]): the business rules of one resource type.
//! 2. **Runtime** ([`StoreActor`]): message loop, versioning, commit-on-success.
//! 3. **Interface** ([`StoreClient`], [`EntityClient`]): typed async calls.
//!
//! ## Testing
//!
//! See [`mock`] for helpers that let a test stand in for the actor.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod version;

pub use actor::StoreActor;
pub use client::StoreClient;
pub use client_trait::EntityClient;
pub use entity::StoreEntity;
pub use error::StoreError;
pub use message::{Response, StoreRequest};
pub use version::{ParseVersionError, Version, Versioned};

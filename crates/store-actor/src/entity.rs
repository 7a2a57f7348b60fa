//! # StoreEntity Trait
//!
//! The contract every resource (User, Product, ...) implements to be kept by a
//! [`StoreActor`](crate::StoreActor). Associated types fix the id, the DTOs for each
//! operation, the custom actions and the error type, so a `Product` actor can never be sent a
//! `UserCreate` payload.
//!
//! Hooks are synchronous and run on a copy of the stored entity. The actor only commits the
//! copy (and advances the version) when the hook returns `Ok`, so a failed hook never leaves a
//! half-applied change behind.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by a `StoreActor`.
pub trait StoreEntity: Clone + Send + Sync + 'static {
    /// Caller-assigned identifier.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// The data a caller must present to delete an instance.
    type Delete: Send + Sync + Debug;

    /// Enum representing resource-specific operations (e.g. `Reserve`).
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// Per-entity error type, surfaced through `StoreError::EntityError`.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the entity from its id and creation payload.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Apply an update to the entity.
    fn on_update(&mut self, update: Self::Update) -> Result<(), Self::Error>;

    /// Called before the entity is removed; returning an error keeps it in the store.
    fn on_delete(&self, _confirm: &Self::Delete) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Handle a custom resource-specific action.
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}

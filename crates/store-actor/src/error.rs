//! # Store Errors
//!
//! Errors raised by the store actor itself, as opposed to the entity hooks. Entity hook
//! failures are carried in [`StoreError::EntityError`] and can be recovered with
//! [`StoreError::entity_error`].

use crate::version::Version;
use std::any::Any;

/// Errors that can occur while talking to a [`StoreActor`](crate::StoreActor).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    AlreadyExists(String),
    /// `latest` holds the entity as it stood when the guard was checked; see
    /// [`StoreError::conflict_state`].
    #[error("Version conflict on {id}: expected {expected}, current {current}")]
    VersionConflict {
        id: String,
        expected: Version,
        current: Version,
        latest: Box<dyn Any + Send + Sync>,
    },
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Borrow the entity error if this is an [`StoreError::EntityError`] of type `E`.
    pub fn entity_error<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            StoreError::EntityError(e) => e.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Borrow the entity state captured with a [`StoreError::VersionConflict`].
    pub fn conflict_state<T: 'static>(&self) -> Option<&T> {
        match self {
            StoreError::VersionConflict { latest, .. } => latest.downcast_ref::<T>(),
            _ => None,
        }
    }
}

//! Error types for the Product actor.

use store_actor::Version;
use thiserror::Error;

/// Errors that can occur during product operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    /// The requested product was not found.
    #[error("Product not found: {0}")]
    NotFound(String),

    /// A product with the same id already exists.
    #[error("Product already exists: {0}")]
    AlreadyExists(String),

    /// The requested quantity exceeds the available stock.
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    /// The product data provided is invalid.
    #[error("Product validation error: {0}")]
    ValidationError(String),

    /// The details presented for a delete do not match the stored product.
    #[error("Product details do not match: {0}")]
    Mismatch(String),

    /// The product moved past the version the caller observed. `quantity` is the stock
    /// held at `current`, when the store reported it.
    #[error("Version conflict: expected {expected}, current {current}")]
    VersionConflict {
        expected: Version,
        current: Version,
        quantity: Option<i64>,
    },

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

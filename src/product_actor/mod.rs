//! # Product Actor
//!
//! Product catalogue and inventory, kept by a [`StoreActor`]. Beyond CRUD it exposes the
//! stock actions in [`ProductAction`]; the reservation used by orders is always sent as a
//! guarded action so it only applies to the version of the product the caller looked at.
//!
//! - [`entity`]: [`StoreEntity`](store_actor::StoreEntity) implementation for [`Product`]
//! - [`error`]: [`ProductError`]
//! - [`actions`]: [`ProductAction`] and [`ProductActionResult`]

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::ProductClient;
use crate::model::Product;
use store_actor::StoreActor;

/// Creates a new Product actor and its client.
pub fn new() -> (StoreActor<Product>, ProductClient) {
    let (actor, generic_client) = StoreActor::new(32);
    (actor, ProductClient::new(generic_client))
}

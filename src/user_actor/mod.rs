//! User-specific resource logic and entity implementation.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::UserClient;
use crate::model::User;
use store_actor::StoreActor;

/// Creates a new User actor and its client.
pub fn new() -> (StoreActor<User>, UserClient) {
    let (actor, generic_client) = StoreActor::new(32);
    (actor, UserClient::new(generic_client))
}

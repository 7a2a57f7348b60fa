//! Type-safe wrappers around [`StoreClient`](store_actor::StoreClient) for the collaborator stores.

pub mod product_client;
pub mod user_client;

pub use product_client::*;
pub use user_client::*;

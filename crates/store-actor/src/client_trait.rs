//! # EntityClient Trait
//!
//! Common interface for resource-specific clients: default `get` and `delete` built on top
//! of a [`StoreClient`], with store errors mapped into the resource's own error type.

use crate::{StoreClient, StoreEntity, StoreError, Versioned};
use async_trait::async_trait;

#[async_trait]
pub trait EntityClient<T: StoreEntity>: Send + Sync {
    /// The resource-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic client.
    fn inner(&self) -> &StoreClient<T>;

    /// Map store errors to the resource error type.
    fn map_error(e: StoreError) -> Self::Error;

    /// Fetch an entity and its current version.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<Versioned<T>>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Delete an entity, presenting the confirmation payload its `on_delete` hook checks.
    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: T::Id, confirm: T::Delete) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner()
            .delete(id, confirm)
            .await
            .map_err(Self::map_error)
    }
}

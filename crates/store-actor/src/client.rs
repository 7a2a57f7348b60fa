//! # Store Client
//!
//! The cloneable, async interface to a [`StoreActor`](crate::StoreActor). It holds only the
//! sending half of the channel; each call sends one [`StoreRequest`] and awaits the reply on a
//! oneshot channel.

use crate::entity::StoreEntity;
use crate::error::StoreError;
use crate::message::StoreRequest;
use crate::version::{Version, Versioned};
use tokio::sync::{mpsc, oneshot};

/// A type-safe client for interacting with a `StoreActor`.
pub struct StoreClient<T: StoreEntity> {
    sender: mpsc::Sender<StoreRequest<T>>,
}

// Derive would require `T: Clone` on the sender's behalf.
impl<T: StoreEntity> Clone for StoreClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: StoreEntity> StoreClient<T> {
    pub fn new(sender: mpsc::Sender<StoreRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<R, StoreError>>) -> StoreRequest<T>,
    ) -> Result<R, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::ActorClosed)?;
        response.await.map_err(|_| StoreError::ActorDropped)?
    }

    pub async fn create(&self, id: T::Id, params: T::Create) -> Result<Versioned<T>, StoreError> {
        self.request(|respond_to| StoreRequest::Create {
            id,
            params,
            respond_to,
        })
        .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<Versioned<T>>, StoreError> {
        self.request(|respond_to| StoreRequest::Get { id, respond_to })
            .await
    }

    pub async fn update(&self, id: T::Id, update: T::Update) -> Result<Versioned<T>, StoreError> {
        self.request(|respond_to| StoreRequest::Update {
            id,
            update,
            respond_to,
        })
        .await
    }

    pub async fn delete(&self, id: T::Id, confirm: T::Delete) -> Result<(), StoreError> {
        self.request(|respond_to| StoreRequest::Delete {
            id,
            confirm,
            respond_to,
        })
        .await
    }

    /// Run an action only if the entity is still at `expected`.
    ///
    /// Fails with [`StoreError::VersionConflict`] otherwise, without touching the entity.
    pub async fn perform_guarded_action(
        &self,
        id: T::Id,
        expected: Version,
        action: T::Action,
    ) -> Result<Versioned<T::ActionResult>, StoreError> {
        self.request(|respond_to| StoreRequest::Action {
            id,
            expected,
            action,
            respond_to,
        })
        .await
    }
}

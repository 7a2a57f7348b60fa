//! # Store Messages
//!
//! Requests sent from a [`StoreClient`](crate::StoreClient) to its
//! [`StoreActor`](crate::StoreActor). The variants map to CRUD plus a custom `Action`; an
//! action always carries the version the caller expects the entity to be at.

use crate::entity::StoreEntity;
use crate::error::StoreError;
use crate::version::{Version, Versioned};
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

#[derive(Debug)]
pub enum StoreRequest<T: StoreEntity> {
    Create {
        id: T::Id,
        params: T::Create,
        respond_to: Response<Versioned<T>>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<Versioned<T>>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<Versioned<T>>,
    },
    Delete {
        id: T::Id,
        confirm: T::Delete,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        /// The action is only applied if the entity is still at this version.
        expected: Version,
        action: T::Action,
        respond_to: Response<Versioned<T::ActionResult>>,
    },
}

//! # Mock Helpers
//!
//! Build a [`StoreClient`] whose requests land on a receiver owned by the test, so client
//! wrappers can be tested without running an actor. The test plays the actor: it pulls the
//! next request with one of the `expect_*` helpers and answers through the returned sender,
//! which makes failures such as a closed actor or a version conflict easy to inject.

use crate::{StoreClient, StoreEntity, StoreError, StoreRequest, Version, Versioned};
use tokio::sync::{mpsc, oneshot};

/// Creates a client and the receiver its requests are delivered to.
pub fn create_mock_client<T: StoreEntity>(
    buffer_size: usize,
) -> (StoreClient<T>, mpsc::Receiver<StoreRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Returns the next request if it is a `Get`.
pub async fn expect_get<T: StoreEntity>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T::Id, oneshot::Sender<Result<Option<Versioned<T>>, StoreError>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Returns the next request if it is an `Action`, with the version it was guarded by.
#[allow(clippy::type_complexity)]
pub async fn expect_action<T: StoreEntity>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(
    T::Id,
    Version,
    T::Action,
    oneshot::Sender<Result<Versioned<T::ActionResult>, StoreError>>,
)> {
    match receiver.recv().await {
        Some(StoreRequest::Action {
            id,
            expected,
            action,
            respond_to,
        }) => Some((id, expected, action, respond_to)),
        _ => None,
    }
}

//! # Store Actor
//!
//! The `StoreActor` owns the in-memory map for one entity type and processes every
//! [`StoreRequest`] sequentially. Because a single task owns the map, no locks are needed and
//! the version check of a guarded action happens in the same step as the mutation it guards:
//! two concurrent callers holding the same version can never both apply.

use crate::client::StoreClient;
use crate::entity::StoreEntity;
use crate::error::StoreError;
use crate::message::StoreRequest;
use crate::version::{Version, Versioned};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that manages a collection of versioned entities.
///
/// # Usage Pattern
///
/// 1. Call `StoreActor::new()` to get the `actor` (server) and `client` (interface).
/// 2. Spawn `actor.run()` in a background task.
/// 3. Clone the client wherever the store is needed.
///
/// ```rust
/// use store_actor::{StoreActor, StoreEntity};
///
/// #[derive(Clone, Debug)] struct Counter { id: u32, value: i64 }
/// #[derive(Debug)] struct CounterCreate;
/// #[derive(Debug)] struct CounterUpdate(i64);
/// #[derive(Debug)] enum CounterAction { Add(i64) }
/// #[derive(Debug, thiserror::Error)] #[error("counter error")] struct CounterError;
///
/// impl StoreEntity for Counter {
///     type Id = u32; type Create = CounterCreate; type Update = CounterUpdate; type Delete = ();
///     type Action = CounterAction; type ActionResult = i64; type Error = CounterError;
///
///     fn from_create_params(id: u32, _: CounterCreate) -> Result<Self, Self::Error> {
///         Ok(Self { id, value: 0 })
///     }
///     fn on_update(&mut self, update: CounterUpdate) -> Result<(), Self::Error> {
///         self.value = update.0;
///         Ok(())
///     }
///     fn handle_action(&mut self, action: CounterAction) -> Result<i64, Self::Error> {
///         match action { CounterAction::Add(n) => { self.value += n; Ok(self.value) } }
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = StoreActor::<Counter>::new(10);
///     tokio::spawn(actor.run());
///
///     let created = client.create(1, CounterCreate).await.unwrap();
///     let added = client
///         .perform_guarded_action(1, created.version, CounterAction::Add(5))
///         .await
///         .unwrap();
///     assert_eq!(added.value, 5);
///
///     // The version moved on, so a second guarded call with the old version is refused.
///     assert!(client
///         .perform_guarded_action(1, created.version, CounterAction::Add(5))
///         .await
///         .is_err());
/// }
/// ```
pub struct StoreActor<T: StoreEntity> {
    receiver: mpsc::Receiver<StoreRequest<T>>,
    store: HashMap<T::Id, Versioned<T>>,
}

impl<T: StoreEntity> StoreActor<T> {
    /// Creates a new `StoreActor` and its associated `StoreClient`.
    ///
    /// `buffer_size` is the capacity of the request channel; callers wait when it is full.
    pub fn new(buffer_size: usize) -> (Self, StoreClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
        };
        (actor, StoreClient::new(sender))
    }

    /// Runs the actor's event loop until every client has been dropped.
    pub async fn run(mut self) {
        // "Product" instead of "order_saga::model::product::Product"
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Create {
                    id,
                    params,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?params, "Create");
                    if self.store.contains_key(&id) {
                        warn!(entity_type, %id, "Already exists");
                        let _ = respond_to.send(Err(StoreError::AlreadyExists(id.to_string())));
                        continue;
                    }
                    match T::from_create_params(id.clone(), params) {
                        Ok(item) => {
                            let entry = Versioned::new(item, Version::INITIAL);
                            self.store.insert(id.clone(), entry.clone());
                            info!(entity_type, %id, size = self.store.len(), "Created");
                            let _ = respond_to.send(Ok(entry));
                        }
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Create failed");
                            let _ = respond_to.send(Err(StoreError::EntityError(Box::new(e))));
                        }
                    }
                }
                StoreRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    debug!(entity_type, %id, found = item.is_some(), "Get");
                    let _ = respond_to.send(Ok(item));
                }
                StoreRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let Some(entry) = self.store.get_mut(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(StoreError::NotFound(id.to_string())));
                        continue;
                    };
                    let mut next = entry.value.clone();
                    match next.on_update(update) {
                        Ok(()) => {
                            entry.value = next;
                            entry.version = entry.version.next();
                            info!(entity_type, %id, version = %entry.version, "Updated");
                            let _ = respond_to.send(Ok(entry.clone()));
                        }
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Update failed");
                            let _ = respond_to.send(Err(StoreError::EntityError(Box::new(e))));
                        }
                    }
                }
                StoreRequest::Delete {
                    id,
                    confirm,
                    respond_to,
                } => {
                    debug!(entity_type, %id, "Delete");
                    let Some(entry) = self.store.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(StoreError::NotFound(id.to_string())));
                        continue;
                    };
                    if let Err(e) = entry.value.on_delete(&confirm) {
                        warn!(entity_type, %id, error = %e, "on_delete failed");
                        let _ = respond_to.send(Err(StoreError::EntityError(Box::new(e))));
                        continue;
                    }
                    self.store.remove(&id);
                    info!(entity_type, %id, size = self.store.len(), "Deleted");
                    let _ = respond_to.send(Ok(()));
                }
                StoreRequest::Action {
                    id,
                    expected,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, %expected, ?action, "Action");
                    let Some(entry) = self.store.get_mut(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(StoreError::NotFound(id.to_string())));
                        continue;
                    };
                    if expected != entry.version {
                        info!(entity_type, %id, %expected, current = %entry.version, "Version conflict");
                        let _ = respond_to.send(Err(StoreError::VersionConflict {
                            id: id.to_string(),
                            expected,
                            current: entry.version,
                            latest: Box::new(entry.value.clone()),
                        }));
                        continue;
                    }
                    let mut next = entry.value.clone();
                    match next.handle_action(action) {
                        Ok(result) => {
                            entry.value = next;
                            entry.version = entry.version.next();
                            info!(entity_type, %id, version = %entry.version, "Action ok");
                            let _ = respond_to.send(Ok(Versioned::new(result, entry.version)));
                        }
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Action failed");
                            let _ = respond_to.send(Err(StoreError::EntityError(Box::new(e))));
                        }
                    }
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }
}

//! # Product Client
//!
//! High-level API over the `Product` actor: CRUD plus the version-guarded stock
//! reservation the Product service exposes to the order orchestrator.

use crate::model::{Product, ProductCreate, ProductId, ProductUpdate};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};
use async_trait::async_trait;
use store_actor::{EntityClient, StoreClient, StoreError, Version, Versioned};
use tracing::{debug, instrument};

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: StoreClient<Product>,
}

impl ProductClient {
    pub fn new(inner: StoreClient<Product>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, params))]
    pub async fn create_product(
        &self,
        id: ProductId,
        params: ProductCreate,
    ) -> Result<Versioned<Product>, ProductError> {
        debug!("Sending request");
        self.inner.create(id, params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self, update))]
    pub async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Versioned<Product>, ProductError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Apply `delta` to the stock of `id`, but only if the product is still at `expected`.
    ///
    /// Returns the new quantity and the version it now has.
    #[instrument(skip(self))]
    pub async fn reserve_stock(
        &self,
        id: ProductId,
        expected: Version,
        delta: i64,
    ) -> Result<Versioned<i64>, ProductError> {
        debug!("Reserving stock");
        let applied = self
            .inner
            .perform_guarded_action(id, expected, ProductAction::AdjustStock(delta))
            .await
            .map_err(Self::map_error)?;
        match applied.value {
            ProductActionResult::AdjustStock(quantity) => {
                Ok(Versioned::new(quantity, applied.version))
            }
        }
    }
}

#[async_trait]
impl EntityClient<Product> for ProductClient {
    type Error = ProductError;

    fn inner(&self) -> &StoreClient<Product> {
        &self.inner
    }

    fn map_error(e: StoreError) -> Self::Error {
        if let Some(entity) = e.entity_error::<ProductError>() {
            return entity.clone();
        }
        let quantity = e.conflict_state::<Product>().map(|p| p.quantity);
        match e {
            StoreError::NotFound(id) => ProductError::NotFound(id),
            StoreError::AlreadyExists(id) => ProductError::AlreadyExists(id),
            StoreError::VersionConflict {
                expected, current, ..
            } => ProductError::VersionConflict {
                expected,
                current,
                quantity,
            },
            other => ProductError::ActorCommunicationError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store_actor::mock::{create_mock_client, expect_action};

    #[tokio::test]
    async fn test_reserve_stock_sends_guarded_action() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let products = ProductClient::new(client);

        let task = tokio::spawn(async move {
            products.reserve_stock(ProductId(7), Version(0), -3).await
        });

        let (id, expected, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        assert_eq!(id, ProductId(7));
        assert_eq!(expected, Version(0));
        assert!(matches!(action, ProductAction::AdjustStock(-3)));

        responder
            .send(Ok(Versioned::new(ProductActionResult::AdjustStock(2), Version(1))))
            .unwrap();

        let reserved = task.await.unwrap().unwrap();
        assert_eq!(reserved, Versioned::new(2, Version(1)));
    }

    #[tokio::test]
    async fn test_reserve_stock_conflict() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let products = ProductClient::new(client);

        let task = tokio::spawn(async move {
            products.reserve_stock(ProductId(7), Version(0), -1).await
        });

        let (_, _, _, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        responder
            .send(Err(StoreError::VersionConflict {
                id: "product_7".into(),
                expected: Version(0),
                current: Version(2),
                latest: Box::new(Product {
                    id: ProductId(7),
                    name: "lamp".into(),
                    description: "desk lamp".into(),
                    price: 9.5,
                    quantity: 4,
                }),
            }))
            .unwrap();

        assert_eq!(
            task.await.unwrap(),
            Err(ProductError::VersionConflict {
                expected: Version(0),
                current: Version(2),
                quantity: Some(4),
            })
        );
    }

    #[tokio::test]
    async fn test_entity_error_is_recovered() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let products = ProductClient::new(client);

        let task = tokio::spawn(async move {
            products.reserve_stock(ProductId(7), Version(0), -9).await
        });

        let (_, _, _, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        responder
            .send(Err(StoreError::EntityError(Box::new(
                ProductError::InsufficientStock {
                    requested: 9,
                    available: 5,
                },
            ))))
            .unwrap();

        assert_eq!(
            task.await.unwrap(),
            Err(ProductError::InsufficientStock {
                requested: 9,
                available: 5
            })
        );
    }
}

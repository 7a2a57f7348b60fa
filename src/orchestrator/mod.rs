//! # Order Orchestrator
//!
//! Places one order per request by walking a fixed sequence of steps against the User and
//! Product services:
//!
//! 1. validate the body (no remote call on failure)
//! 2. confirm the user exists
//! 3. look up the product and take a [`ProductSnapshot`]
//! 4. check the snapshot covers the quantity
//! 5. send a token-gated [`ReserveCommand`]
//!
//! A conflict at step 5 sends the request back to step 3 until the [`RetryPolicy`] runs out.
//! Every request ends in exactly one [`OrderResult`]. The orchestrator keeps no state
//! between requests, so one instance is shared by all in-flight orders.

pub mod error;

pub use error::*;

use crate::directory::{Directory, LookupOutcome, MutateOutcome, Service};
use crate::model::{OrderRequest, PlacedOrder, ProductId, UserId};
use crate::reservation::{reported_quantity, ProductSnapshot, ReserveCommand, RetryPolicy};
use crate::wire::FlatObject;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// The command string an order body must carry.
pub const PLACE_ORDER: &str = "place order";

/// Terminal state of one order request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderResult {
    Success(PlacedOrder),
    Rejected { reason: OrderError },
    Conflict { reason: OrderError },
}

impl From<Result<PlacedOrder, OrderError>> for OrderResult {
    fn from(result: Result<PlacedOrder, OrderError>) -> Self {
        match result {
            Ok(order) => OrderResult::Success(order),
            Err(reason @ OrderError::ReservationConflict { .. }) => {
                OrderResult::Conflict { reason }
            }
            Err(reason) => OrderResult::Rejected { reason },
        }
    }
}

impl OrderResult {
    pub fn status_code(&self) -> u16 {
        match self {
            OrderResult::Success(_) => 200,
            OrderResult::Rejected { reason } | OrderResult::Conflict { reason } => {
                reason.status_code()
            }
        }
    }

    pub fn to_wire(&self) -> FlatObject {
        match self {
            OrderResult::Success(order) => FlatObject::new()
                .with_int("product_id", order.product_id.0)
                .with_int("user_id", order.user_id.0)
                .with_int("quantity", order.quantity)
                .with_text("status", "Success"),
            OrderResult::Rejected { reason } | OrderResult::Conflict { reason } => {
                FlatObject::new().with_text("status", reason.status())
            }
        }
    }
}

/// Parse and check a `place order` body.
pub fn validate(body: &FlatObject) -> Result<OrderRequest, OrderError> {
    match body.get("command") {
        Some(command) if command.literal() == PLACE_ORDER => {}
        _ => return Err(OrderError::Validation("command must be `place order`".into())),
    }
    let field = |key: &str| {
        body.parse::<i64>(key)
            .map_err(|e| OrderError::Validation(e.to_string()))
    };
    let request = OrderRequest {
        user_id: UserId(field("user_id")?),
        product_id: ProductId(field("product_id")?),
        quantity: field("quantity")?,
    };
    if request.quantity <= 0 {
        return Err(OrderError::Validation(format!(
            "quantity must be positive, got {}",
            request.quantity
        )));
    }
    Ok(request)
}

#[derive(Clone)]
pub struct OrderOrchestrator {
    directory: Arc<dyn Directory>,
    policy: RetryPolicy,
}

impl OrderOrchestrator {
    pub fn new(directory: Arc<dyn Directory>, policy: RetryPolicy) -> Self {
        Self { directory, policy }
    }

    /// Run one order body through to its terminal state.
    #[instrument(name = "place_order", skip_all)]
    pub async fn place(&self, body: &FlatObject) -> OrderResult {
        debug!(%body, "place called");
        let result = match validate(body) {
            Ok(request) => self.place_validated(request).await,
            Err(e) => Err(e),
        };
        match &result {
            Ok(order) => info!(
                user_id = order.user_id.0,
                product_id = order.product_id.0,
                quantity = order.quantity,
                "Order placed"
            ),
            Err(e) => warn!(error = %e, "Order not placed"),
        }
        result.into()
    }

    async fn place_validated(&self, request: OrderRequest) -> Result<PlacedOrder, OrderError> {
        self.confirm_user(request.user_id).await?;
        let snapshot = self.snapshot_product(request.product_id).await?;
        self.reserve(request, snapshot).await
    }

    #[instrument(skip(self))]
    async fn confirm_user(&self, user_id: UserId) -> Result<(), OrderError> {
        match self.directory.lookup(Service::User, user_id.0).await {
            LookupOutcome::Found(_) => Ok(()),
            LookupOutcome::NotFound => Err(OrderError::NotFound(user_id.to_string())),
            LookupOutcome::Unreachable => Err(OrderError::Unreachable(Service::User.to_string())),
            LookupOutcome::Unexpected(status) => Err(OrderError::UnexpectedReply(format!(
                "user lookup answered {status}"
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn snapshot_product(&self, product_id: ProductId) -> Result<ProductSnapshot, OrderError> {
        let attributes = match self.directory.lookup(Service::Product, product_id.0).await {
            LookupOutcome::Found(attributes) => attributes,
            LookupOutcome::NotFound => {
                return Err(OrderError::NotFound(product_id.to_string()));
            }
            LookupOutcome::Unreachable => {
                return Err(OrderError::Unreachable(Service::Product.to_string()));
            }
            LookupOutcome::Unexpected(status) => {
                return Err(OrderError::UnexpectedReply(format!(
                    "product lookup answered {status}"
                )));
            }
        };
        let snapshot = ProductSnapshot::from_wire(&attributes)
            .map_err(|e| OrderError::UnexpectedReply(format!("product snapshot: {e}")))?;
        if snapshot.id != product_id.0 {
            return Err(OrderError::UnexpectedReply(format!(
                "product lookup for {product_id} described product {}",
                snapshot.id
            )));
        }
        debug!(quantity = snapshot.quantity, token = %snapshot.token, "Snapshot taken");
        Ok(snapshot)
    }

    /// Steps 4 and 5, going back to step 3 after each conflict.
    async fn reserve(
        &self,
        request: OrderRequest,
        first: ProductSnapshot,
    ) -> Result<PlacedOrder, OrderError> {
        let mut snapshot = first;
        for attempt in 1..=self.policy.max_attempts {
            if attempt > 1 {
                if !self.policy.backoff.is_zero() {
                    tokio::time::sleep(self.policy.backoff).await;
                }
                snapshot = self.snapshot_product(request.product_id).await?;
            }

            if request.quantity > snapshot.quantity {
                return Err(OrderError::Capacity {
                    requested: request.quantity,
                    available: snapshot.quantity,
                });
            }

            let command = ReserveCommand::take(request.product_id.0, &snapshot, request.quantity);
            info!(attempt, product_id = command.id, token = %command.expected_token, "Reserving stock");
            let outcome = self
                .directory
                .mutate(
                    Service::Product,
                    command.id,
                    ReserveCommand::NAME,
                    command.payload(),
                )
                .await;

            match outcome {
                MutateOutcome::Applied(_) => {
                    return Ok(PlacedOrder {
                        product_id: request.product_id,
                        user_id: request.user_id,
                        quantity: request.quantity,
                    });
                }
                MutateOutcome::Conflict(current) => {
                    match reported_quantity(current.as_ref()) {
                        Some(available) if available < request.quantity => {
                            return Err(OrderError::Capacity {
                                requested: request.quantity,
                                available,
                            });
                        }
                        _ => debug!(attempt, "Reservation conflicted"),
                    }
                }
                MutateOutcome::Rejected(status) => {
                    return Err(OrderError::ReservationRejected(status));
                }
                MutateOutcome::Unreachable => {
                    return Err(OrderError::Unreachable(Service::Product.to_string()));
                }
            }
        }
        Err(OrderError::ReservationConflict {
            attempts: self.policy.max_attempts,
        })
    }
}

use crate::model::{ProductId, UserId};

/// A validated place-order request. Exists only for the duration of one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderRequest {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i64,
}

/// The order as confirmed to the caller after stock was reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedOrder {
    pub product_id: ProductId,
    pub user_id: UserId,
    pub quantity: i64,
}

//! Custom actions for the Product actor.

/// Stock operations on a product beyond standard CRUD.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Adds `delta` (negative to take stock) to the quantity on hand.
    ///
    /// Fails without changing anything if the result would be negative.
    AdjustStock(i64),
}

/// Results from [`ProductAction`]s; variants match 1:1.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductActionResult {
    /// The quantity on hand after the adjustment.
    AdjustStock(i64),
}

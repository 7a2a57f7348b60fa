use std::fmt::Display;

/// Caller-assigned product identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProductId(pub i64);

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "product_{}", self.0)
    }
}

/// A product in the inventory. `quantity` is the stock on hand and never drops below zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
}

/// Fields that must match the stored product for a delete to go through.
/// `description` is only compared when supplied.
#[derive(Debug, Clone)]
pub struct ProductDelete {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i64,
}

//! [`StoreEntity`] implementation for [`Product`].
//!
//! Stock may never go below zero: creation, updates and [`ProductAction::AdjustStock`] all
//! refuse a negative quantity.

use super::actions::{ProductAction, ProductActionResult};
use super::ProductError;
use crate::model::{Product, ProductCreate, ProductDelete, ProductId, ProductUpdate};
use store_actor::StoreEntity;

fn require_text(field: &str, value: &str) -> Result<(), ProductError> {
    if value.trim().is_empty() {
        Err(ProductError::ValidationError(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

fn require_stock(quantity: i64) -> Result<(), ProductError> {
    if quantity < 0 {
        Err(ProductError::ValidationError(format!(
            "quantity must not be negative, got {quantity}"
        )))
    } else {
        Ok(())
    }
}

impl StoreEntity for Product {
    type Id = ProductId;
    type Create = ProductCreate;
    type Update = ProductUpdate;
    type Delete = ProductDelete;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Error = ProductError;

    fn from_create_params(id: ProductId, params: ProductCreate) -> Result<Self, Self::Error> {
        require_text("name", &params.name)?;
        require_text("description", &params.description)?;
        require_stock(params.quantity)?;
        Ok(Self {
            id,
            name: params.name,
            description: params.description,
            price: params.price,
            quantity: params.quantity,
        })
    }

    fn on_update(&mut self, update: ProductUpdate) -> Result<(), Self::Error> {
        if let Some(name) = update.name {
            require_text("name", &name)?;
            self.name = name;
        }
        if let Some(description) = update.description {
            require_text("description", &description)?;
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(quantity) = update.quantity {
            require_stock(quantity)?;
            self.quantity = quantity;
        }
        Ok(())
    }

    fn on_delete(&self, confirm: &ProductDelete) -> Result<(), Self::Error> {
        let description_matches = confirm
            .description
            .as_ref()
            .is_none_or(|d| *d == self.description);
        let matches = confirm.name == self.name
            && description_matches
            && confirm.price == self.price
            && confirm.quantity == self.quantity;
        if matches {
            Ok(())
        } else {
            Err(ProductError::Mismatch(self.id.to_string()))
        }
    }

    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, Self::Error> {
        match action {
            ProductAction::AdjustStock(delta) => {
                let next = self.quantity.checked_add(delta).ok_or_else(|| {
                    ProductError::ValidationError(format!("delta {delta} overflows stock"))
                })?;
                if next < 0 {
                    let requested = delta.checked_neg().ok_or_else(|| {
                        ProductError::ValidationError(format!("delta {delta} is out of range"))
                    })?;
                    return Err(ProductError::InsufficientStock {
                        requested,
                        available: self.quantity,
                    });
                }
                self.quantity = next;
                Ok(ProductActionResult::AdjustStock(next))
            }
        }
    }
}

//! Line item domain model.
//!
//! # Responsibility
//! - Define the product entry stored in the cart and its add-to-cart input.
//! - Validate per-item invariants before state is accepted from storage.
//!
//! # Invariants
//! - `id` is externally assigned and never empty.
//! - `quantity` is always `>= 1` for an item held in a cart.
//! - `price` is finite and non-negative.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Product identifier assigned by the catalog, not by this crate.
pub type ProductId = String;

/// Validation failures for line items and item collections.
#[derive(Debug, Clone, PartialEq)]
pub enum LineItemValidationError {
    EmptyId,
    ZeroQuantity { id: ProductId },
    InvalidPrice { id: ProductId, price: f64 },
    DuplicateId(ProductId),
}

impl Display for LineItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "line item id cannot be empty"),
            Self::ZeroQuantity { id } => write!(f, "line item `{id}` has quantity 0"),
            Self::InvalidPrice { id, price } => {
                write!(f, "line item `{id}` has invalid price {price}")
            }
            Self::DuplicateId(id) => write!(f, "line item id `{id}` appears more than once"),
        }
    }
}

impl Error for LineItemValidationError {}

/// One product entry in the cart.
///
/// Field names are the persisted JSON names and must stay stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    /// Unit price as shown by the catalog.
    pub price: f64,
    pub quantity: u32,
}

impl LineItem {
    /// Checks item-level invariants.
    ///
    /// # Errors
    /// - `EmptyId` when `id` is blank.
    /// - `ZeroQuantity` when `quantity == 0`.
    /// - `InvalidPrice` when `price` is NaN, infinite or negative.
    pub fn validate(&self) -> Result<(), LineItemValidationError> {
        validate_identity(&self.id, self.price)?;
        if self.quantity == 0 {
            return Err(LineItemValidationError::ZeroQuantity {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Add-to-cart input: a line item without a quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    pub price: f64,
}

impl NewLineItem {
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    /// Checks id and price before the item enters a cart.
    pub fn validate(&self) -> Result<(), LineItemValidationError> {
        validate_identity(&self.id, self.price)
    }

    /// Converts into a cart entry with quantity 1.
    pub fn into_line_item(self) -> LineItem {
        LineItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity: 1,
        }
    }
}

fn validate_identity(id: &str, price: f64) -> Result<(), LineItemValidationError> {
    if id.trim().is_empty() {
        return Err(LineItemValidationError::EmptyId);
    }
    if !price.is_finite() || price < 0.0 {
        return Err(LineItemValidationError::InvalidPrice {
            id: id.to_string(),
            price,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{LineItem, LineItemValidationError, NewLineItem};

    fn shoe() -> LineItem {
        NewLineItem::new("p1", "Shoe", "u", 10.0).into_line_item()
    }

    #[test]
    fn new_item_starts_with_quantity_one() {
        let item = shoe();
        assert_eq!(item.quantity, 1);
        assert!(item.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_quantity_and_blank_id() {
        let mut item = shoe();
        item.quantity = 0;
        assert!(matches!(
            item.validate(),
            Err(LineItemValidationError::ZeroQuantity { .. })
        ));

        let mut blank = shoe();
        blank.id = "  ".to_string();
        assert_eq!(blank.validate(), Err(LineItemValidationError::EmptyId));
    }

    #[test]
    fn validate_rejects_non_finite_price() {
        let mut item = shoe();
        item.price = f64::NAN;
        assert!(matches!(
            item.validate(),
            Err(LineItemValidationError::InvalidPrice { .. })
        ));

        item.price = -1.0;
        assert!(item.validate().is_err());
    }

    #[test]
    fn serializes_with_persisted_field_names() {
        let value = serde_json::to_value(shoe()).unwrap();
        assert_eq!(value["id"], "p1");
        assert_eq!(value["image_url"], "u");
        assert_eq!(value["price"], 10.0);
        assert_eq!(value["quantity"], 1);
    }
}

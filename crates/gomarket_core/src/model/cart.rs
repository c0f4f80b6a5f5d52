//! Cart collection model.
//!
//! # Responsibility
//! - Hold ordered line items and apply add/increment/decrement transitions.
//! - Keep the transition rules free of storage and locking concerns.
//!
//! # Invariants
//! - Item ids are unique within a cart.
//! - Every held item has `quantity >= 1`; an item leaves the cart exactly when
//!   its quantity would drop below 1.
//! - Insertion order reflects add order.

use crate::model::line_item::{LineItem, LineItemValidationError, NewLineItem};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Outcome of a single cart transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// New item appended with quantity 1.
    Added,
    /// Existing item quantity raised to the contained value.
    Incremented(u32),
    /// Existing item quantity lowered to the contained value.
    Decremented(u32),
    /// Item with quantity 1 left the cart.
    Removed,
    /// No item matched the id.
    Unchanged,
}

/// Ordered cart contents, persisted as a plain JSON array.
///
/// Deserializing validates the items, so a decoded cart always holds the
/// invariants above.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from already-quantified items (e.g. a storage payload).
    ///
    /// # Errors
    /// Returns the first item-level violation, or `DuplicateId` when two
    /// items share an id.
    pub fn from_items(items: Vec<LineItem>) -> Result<Self, LineItemValidationError> {
        let cart = Self { items };
        cart.validate()?;
        Ok(cart)
    }

    /// Checks every cart invariant.
    pub fn validate(&self) -> Result<(), LineItemValidationError> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            item.validate()?;
            if !seen.insert(item.id.as_str()) {
                return Err(LineItemValidationError::DuplicateId(item.id.clone()));
            }
        }
        Ok(())
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Sum of all quantities, used for badge counts.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Adds one unit of `item`.
    ///
    /// An existing entry with the same id is incremented and keeps its stored
    /// title, image and price.
    pub fn add(&mut self, item: NewLineItem) -> CartChange {
        if self.get(&item.id).is_some() {
            return self.increment(&item.id);
        }
        self.items.push(item.into_line_item());
        CartChange::Added
    }

    /// Raises the quantity of `id` by one; unknown ids leave the cart as is.
    pub fn increment(&mut self, id: &str) -> CartChange {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                CartChange::Incremented(item.quantity)
            }
            None => CartChange::Unchanged,
        }
    }

    /// Lowers the quantity of `id` by one, removing the entry at quantity 1.
    pub fn decrement(&mut self, id: &str) -> CartChange {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            return CartChange::Unchanged;
        };

        let item = &mut self.items[index];
        if item.quantity > 1 {
            item.quantity -= 1;
            return CartChange::Decremented(item.quantity);
        }

        self.items.remove(index);
        CartChange::Removed
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = LineItemValidationError;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

#[cfg(test)]
mod tests {
    use super::{Cart, CartChange};
    use crate::model::line_item::{LineItemValidationError, NewLineItem};

    #[test]
    fn add_existing_id_increments_without_overwriting_fields() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.add(NewLineItem::new("p1", "Shoe", "u", 10.0)),
            CartChange::Added
        );
        assert_eq!(
            cart.add(NewLineItem::new("p1", "Renamed", "other", 99.0)),
            CartChange::Incremented(2)
        );

        let item = cart.get("p1").unwrap();
        assert_eq!(item.title, "Shoe");
        assert_eq!(item.image_url, "u");
        assert_eq!(item.price, 10.0);
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn decrement_at_one_removes_entry() {
        let mut cart = Cart::new();
        cart.add(NewLineItem::new("p1", "Shoe", "u", 10.0));
        assert_eq!(cart.decrement("p1"), CartChange::Removed);
        assert!(cart.is_empty());
    }

    #[test]
    fn unknown_ids_are_unchanged() {
        let mut cart = Cart::new();
        cart.add(NewLineItem::new("p1", "Shoe", "u", 10.0));
        let before = cart.clone();

        assert_eq!(cart.increment("missing"), CartChange::Unchanged);
        assert_eq!(cart.decrement("missing"), CartChange::Unchanged);
        assert_eq!(cart, before);
    }

    #[test]
    fn from_items_rejects_duplicate_ids() {
        let item = NewLineItem::new("p1", "Shoe", "u", 10.0).into_line_item();
        let err = Cart::from_items(vec![item.clone(), item]).unwrap_err();
        assert_eq!(err, LineItemValidationError::DuplicateId("p1".to_string()));
    }

    #[test]
    fn deserializing_enforces_cart_invariants() {
        let duplicate = r#"[{"id":"a","title":"t","image_url":"u","price":1.0,"quantity":1},
            {"id":"a","title":"t","image_url":"u","price":1.0,"quantity":2}]"#;
        assert!(serde_json::from_str::<Cart>(duplicate).is_err());

        let zero = r#"[{"id":"a","title":"t","image_url":"u","price":1.0,"quantity":0}]"#;
        assert!(serde_json::from_str::<Cart>(zero).is_err());

        let cart: Cart = serde_json::from_str(
            r#"[{"id":"a","title":"t","image_url":"u","price":1.0,"quantity":3}]"#,
        )
        .unwrap();
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(serde_json::to_string(&Cart::new()).unwrap(), "[]");
    }
}

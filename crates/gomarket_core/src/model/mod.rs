//! Cart domain model.
//!
//! # Responsibility
//! - Define line items and the cart collection used by the store.
//! - Keep transition rules pure so they can be tested without storage.
//!
//! # Invariants
//! - Every item is identified by an externally assigned `ProductId`.
//! - Items are removed, not tombstoned, when their quantity reaches zero.

pub mod cart;
pub mod line_item;

//! Cart use-case services.
//!
//! # Responsibility
//! - Own the live cart and its persistence queue.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod cart_provider;
pub mod cart_store;
pub mod error;

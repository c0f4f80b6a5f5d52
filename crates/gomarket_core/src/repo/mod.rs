//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value contract the cart store persists through.
//! - Isolate SQLite details from the store and its writer queue.
//!
//! # Invariants
//! - Repository APIs return transport errors; they never interpret values.

pub mod kv_repo;
pub mod memory;

//! Core cart logic for the GoMarket mobile app.
//! This crate owns the cart invariants and their device-local persistence.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::cart::{Cart, CartChange};
pub use model::line_item::{LineItem, LineItemValidationError, NewLineItem, ProductId};
pub use repo::kv_repo::{KeyValueRepository, RepoError, RepoResult, SqliteKeyValueRepository};
pub use repo::memory::MemoryKeyValueRepository;
pub use service::cart_provider::CartProvider;
pub use service::cart_store::{CartStore, CartStoreConfig, LoadOutcome, DEFAULT_STORAGE_KEY};
pub use service::error::{CartError, CartResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

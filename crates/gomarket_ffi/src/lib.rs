//! Flutter-facing FFI surface for the GoMarket cart core.

pub mod api;

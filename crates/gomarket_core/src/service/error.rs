//! Cart service error type.

use crate::model::line_item::LineItemValidationError;
use crate::repo::kv_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CartResult<T> = Result<T, CartError>;

#[derive(Debug)]
pub enum CartError {
    /// Cart accessed through a provider that has no store mounted.
    OutsideProvider,
    /// A provider can hold one store for its whole lifetime.
    AlreadyMounted,
    /// `load()` after a successful load or after the first mutation.
    AlreadyLoaded,
    Storage(RepoError),
    /// Stored payload is not a JSON array of line items.
    MalformedCart(String),
    /// Payload or input parsed but breaks a cart invariant.
    InvalidCart(LineItemValidationError),
    Serialize(String),
    WriterSpawn(std::io::Error),
    /// The persistence queue is closed.
    WriterStopped,
}

impl Display for CartError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutsideProvider => write!(f, "use_cart must be used within a CartProvider"),
            Self::AlreadyMounted => write!(f, "cart provider already has a mounted store"),
            Self::AlreadyLoaded => write!(f, "cart was already loaded or modified"),
            Self::Storage(err) => write!(f, "cart storage failed: {err}"),
            Self::MalformedCart(message) => write!(f, "stored cart is malformed: {message}"),
            Self::InvalidCart(err) => write!(f, "invalid cart data: {err}"),
            Self::Serialize(message) => write!(f, "failed to serialize cart: {message}"),
            Self::WriterSpawn(err) => write!(f, "failed to start cart writer: {err}"),
            Self::WriterStopped => write!(f, "cart writer is no longer running"),
        }
    }
}

impl Error for CartError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::InvalidCart(err) => Some(err),
            Self::WriterSpawn(err) => Some(err),
            Self::OutsideProvider
            | Self::AlreadyMounted
            | Self::AlreadyLoaded
            | Self::MalformedCart(_)
            | Self::Serialize(_)
            | Self::WriterStopped => None,
        }
    }
}

impl From<RepoError> for CartError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

impl From<LineItemValidationError> for CartError {
    fn from(value: LineItemValidationError) -> Self {
        Self::InvalidCart(value)
    }
}

//! Provider scope through which UI-facing code reaches the cart store.
//!
//! # Responsibility
//! - Hold at most one mounted `CartStore` for the provider's lifetime.
//! - Turn access outside a mounted scope into a typed usage error.
//!
//! # Invariants
//! - A mounted store is never replaced.
//! - `use_cart` never panics; it returns `CartError::OutsideProvider`.

use crate::service::cart_store::CartStore;
use crate::service::error::{CartError, CartResult};
use log::{error, info};
use once_cell::sync::OnceCell;

#[derive(Default)]
pub struct CartProvider {
    slot: OnceCell<CartStore>,
}

impl CartProvider {
    pub const fn new() -> Self {
        Self {
            slot: OnceCell::new(),
        }
    }

    /// Mounts `store`, failing if another store is already mounted.
    pub fn mount(&self, store: CartStore) -> CartResult<&CartStore> {
        if self.slot.set(store).is_err() {
            error!("event=cart_mount module=cart status=error error_code=already_mounted");
            return Err(CartError::AlreadyMounted);
        }
        info!("event=cart_mount module=cart status=ok");
        self.use_cart()
    }

    /// Mounts the store built by `init` unless one is already mounted.
    ///
    /// `init` runs at most once on success; a failed `init` leaves the provider
    /// empty so a later call can retry.
    pub fn mount_with(
        &self,
        init: impl FnOnce() -> CartResult<CartStore>,
    ) -> CartResult<&CartStore> {
        self.slot.get_or_try_init(|| {
            let store = init()?;
            info!("event=cart_mount module=cart status=ok");
            Ok(store)
        })
    }

    pub fn is_mounted(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Returns the mounted store.
    ///
    /// # Errors
    /// `OutsideProvider` when nothing has been mounted yet.
    pub fn use_cart(&self) -> CartResult<&CartStore> {
        self.slot.get().ok_or(CartError::OutsideProvider)
    }
}

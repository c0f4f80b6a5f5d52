//! FFI cart API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose cart use-cases to Dart via FRB.
//! - Own the single process-level `CartProvider` the UI tree reads from.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Cart calls before `cart_init` return the provider usage error.
//! - The process cart stays bound to the database it was first opened on.

use gomarket_core::db::open_db;
use gomarket_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CartError, CartProvider, CartResult, CartStore, LineItem, LoadOutcome, NewLineItem,
    SqliteKeyValueRepository,
};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const CART_DB_FILE_NAME: &str = "gomarket_cart.sqlite3";
const CART_DB_PATH_ENV: &str = "GOMARKET_DB_PATH";

static CART_PROVIDER: CartProvider = CartProvider::new();
static CART_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Cart line as seen by Dart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartProductItem {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: f64,
    pub quantity: u32,
}

/// Response envelope for every cart call.
#[derive(Debug, Clone, PartialEq)]
pub struct CartResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Cart snapshot after the call; empty on failure.
    pub products: Vec<CartProductItem>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl CartResponse {
    fn success(message: impl Into<String>, products: Vec<LineItem>) -> Self {
        Self {
            ok: true,
            products: products.into_iter().map(to_cart_product_item).collect(),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            products: Vec::new(),
            message: message.into(),
        }
    }
}

/// Opens the cart database, hydrates the cart and mounts it for the process.
///
/// `db_path` may be empty to use `GOMARKET_DB_PATH` or the temp-dir default.
/// Repeated calls return the already mounted cart; an explicit path other
/// than the mounted one is refused. A stored cart that cannot be read is
/// replaced by an empty one.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_init(db_path: String) -> CartResponse {
    let requested = db_path.trim();
    let path = resolve_cart_db_path(requested);
    let mounted = CART_PROVIDER.mount_with(|| {
        let store = open_cart_store(&path)?;
        if let LoadOutcome::Hydrated(count) = store.load_or_reset()? {
            info!("event=cart_init module=ffi status=ok items={count}");
        }
        let _ = CART_DB_PATH.set(path.clone());
        Ok(store)
    });

    let store = match mounted {
        Ok(store) => store,
        Err(err) => return CartResponse::failure(format!("cart_init failed: {err}")),
    };
    if let Err(message) = check_mounted_path(requested, CART_DB_PATH.get()) {
        warn!("event=cart_init module=ffi status=error error_code=db_path_conflict");
        return CartResponse::failure(format!("cart_init failed: {message}"));
    }
    CartResponse::success("Cart ready.", store.products())
}

/// Returns the current cart snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_products() -> CartResponse {
    respond(&CART_PROVIDER, "cart_products", "Cart loaded.", |store| {
        Ok(store.products())
    })
}

/// Adds one unit of a product; an existing product is incremented.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_add(id: String, title: String, image_url: String, price: f64) -> CartResponse {
    let item = NewLineItem::new(id.trim(), title, image_url, price);
    respond(&CART_PROVIDER, "cart_add", "Added to cart.", |store| {
        store.add_to_cart(item)
    })
}

/// Raises a product quantity by one.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_increment(id: String) -> CartResponse {
    respond(&CART_PROVIDER, "cart_increment", "Quantity increased.", |store| {
        store.increment(id.trim())
    })
}

/// Lowers a product quantity by one, removing it at quantity 1.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_decrement(id: String) -> CartResponse {
    respond(&CART_PROVIDER, "cart_decrement", "Quantity decreased.", |store| {
        store.decrement(id.trim())
    })
}

/// Waits for queued cart writes and reports any write failure.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_flush() -> CartResponse {
    respond(&CART_PROVIDER, "cart_flush", "Cart saved.", |store| {
        store.flush()?;
        Ok(store.products())
    })
}

fn respond(
    provider: &CartProvider,
    operation: &str,
    message: &str,
    f: impl FnOnce(&CartStore) -> CartResult<Vec<LineItem>>,
) -> CartResponse {
    match provider.use_cart().and_then(f) {
        Ok(products) => CartResponse::success(message, products),
        Err(err) => {
            if matches!(err, CartError::OutsideProvider) {
                warn!("event={operation} module=ffi status=error error_code=outside_provider");
            }
            CartResponse::failure(format!("{operation} failed: {err}"))
        }
    }
}

fn open_cart_store(path: &Path) -> CartResult<CartStore> {
    let conn = open_db(path).map_err(|err| CartError::Storage(err.into()))?;
    CartStore::spawn(SqliteKeyValueRepository::new(conn))
}

fn check_mounted_path(explicit: &str, mounted: Option<&PathBuf>) -> Result<(), String> {
    match mounted {
        Some(mounted) if !explicit.is_empty() && Path::new(explicit) != mounted.as_path() => {
            Err(format!(
                "cart is already open at {}; refusing to switch to {explicit}",
                mounted.display()
            ))
        }
        _ => Ok(()),
    }
}

fn resolve_cart_db_path(explicit: &str) -> PathBuf {
    if !explicit.is_empty() {
        return PathBuf::from(explicit);
    }
    if let Ok(raw) = std::env::var(CART_DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(CART_DB_FILE_NAME)
}

fn to_cart_product_item(item: LineItem) -> CartProductItem {
    CartProductItem {
        id: item.id,
        title: item.title,
        image_url: item.image_url,
        price: item.price,
        quantity: item.quantity,
    }
}

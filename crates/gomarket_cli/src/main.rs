//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `gomarket_core` linkage without the Flutter/FFI runtime.
//! - Print the cart stored at `GOMARKET_DB_PATH` (or the temp-dir default).

use gomarket_core::db::open_db;
use gomarket_core::{CartStore, SqliteKeyValueRepository};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("gomarket_core ping={}", gomarket_core::ping());
    println!("gomarket_core version={}", gomarket_core::core_version());

    let path = std::env::var("GOMARKET_DB_PATH")
        .ok()
        .filter(|raw| !raw.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("gomarket_cart.sqlite3"));

    let store = match open_db(&path) {
        Ok(conn) => CartStore::spawn(SqliteKeyValueRepository::new(conn)),
        Err(err) => {
            eprintln!("cart db open failed at {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    };
    let store = match store {
        Ok(store) => store,
        Err(err) => {
            eprintln!("cart store start failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = store.load() {
        eprintln!("cart load failed: {err}");
        return ExitCode::FAILURE;
    }

    let products = store.products();
    println!(
        "cart path={} items={} quantity={}",
        path.display(),
        products.len(),
        store.total_quantity()
    );
    for item in products {
        println!("  {} x{} @ {:.2}", item.id, item.quantity, item.price);
    }
    ExitCode::SUCCESS
}

//! Cart store: in-memory cart state plus a single-writer persistence queue.
//!
//! # Responsibility
//! - Own the one live `Cart` and expose load/add/increment/decrement.
//! - Persist the full cart under a fixed key after every mutation.
//!
//! # Invariants
//! - Mutations run under one lock and bump a version, so they never interleave.
//! - Callers see their mutation immediately; the write happens on the writer
//!   thread and is not awaited.
//! - The writer always serializes the latest version, never a captured copy,
//!   and skips versions that are already on disk.
//! - A version whose write failed stays dirty: `flush()` and shutdown write it
//!   again before reporting or exiting.
//! - Write failures are logged and reported by the next `flush()`.
//! - Hydration happens at most once and only before the first mutation;
//!   version 0 is the state that matches storage after `load()`.

use crate::model::cart::{Cart, CartChange};
use crate::model::line_item::{LineItem, NewLineItem};
use crate::repo::kv_repo::{KeyValueRepository, RepoResult};
use crate::service::error::{CartError, CartResult};
use log::{debug, error, info, warn};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Storage key the cart is persisted under.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketplace:products";

const WRITER_THREAD_NAME: &str = "gomarket-cart-writer";

/// Store construction options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartStoreConfig {
    pub storage_key: String,
}

impl Default for CartStoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

/// Result of hydrating the cart from storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A stored cart replaced the in-memory one; carries its item count.
    Hydrated(usize),
    /// Nothing stored under the key yet.
    Empty,
}

struct CartState {
    cart: Cart,
    version: u64,
    loaded: bool,
}

enum WriterCommand {
    Persist,
    Read {
        reply: Sender<RepoResult<Option<String>>>,
    },
    Flush {
        reply: Sender<Option<CartError>>,
    },
}

/// Application-owned cart store.
///
/// Construct once at startup, call [`CartStore::load`], then hand out
/// references (usually through a [`crate::CartProvider`]).
pub struct CartStore {
    state: Arc<Mutex<CartState>>,
    commands: Option<Sender<WriterCommand>>,
    writer: Option<JoinHandle<()>>,
}

impl CartStore {
    /// Starts a store with the default config over `repo`.
    pub fn spawn<R>(repo: R) -> CartResult<Self>
    where
        R: KeyValueRepository + 'static,
    {
        Self::spawn_with_config(repo, CartStoreConfig::default())
    }

    /// Starts a store whose writer thread takes ownership of `repo`.
    ///
    /// The cart starts empty; call [`CartStore::load`] to hydrate it.
    pub fn spawn_with_config<R>(repo: R, config: CartStoreConfig) -> CartResult<Self>
    where
        R: KeyValueRepository + 'static,
    {
        let state = Arc::new(Mutex::new(CartState {
            cart: Cart::new(),
            version: 0,
            loaded: false,
        }));
        let (commands, receiver) = mpsc::channel();

        let writer = CartWriter {
            repo,
            storage_key: config.storage_key,
            state: Arc::clone(&state),
            written_version: Some(0),
            pending_error: None,
        };
        let handle = thread::Builder::new()
            .name(WRITER_THREAD_NAME.to_string())
            .spawn(move || writer.run(receiver))
            .map_err(CartError::WriterSpawn)?;

        Ok(Self {
            state,
            commands: Some(commands),
            writer: Some(handle),
        })
    }

    /// Hydrates the in-memory cart from storage.
    ///
    /// Runs once, right after construction and before any mutation. A failed
    /// load may be retried.
    ///
    /// # Errors
    /// - `AlreadyLoaded` after a successful load or once the cart was mutated.
    /// - `Storage` when the read fails.
    /// - `MalformedCart` / `InvalidCart` when the stored value cannot be
    ///   accepted; the in-memory cart is left untouched.
    pub fn load(&self) -> CartResult<LoadOutcome> {
        let started_at = Instant::now();
        info!("event=cart_load module=cart status=start");
        ensure_unloaded(&lock_state(&self.state))?;

        let result = self.read_stored().and_then(|stored| match stored {
            Some(raw) => decode_cart(&raw).map(Some),
            None => Ok(None),
        });

        match result {
            Ok(Some(cart)) => {
                let count = cart.len();
                let mut state = lock_state(&self.state);
                ensure_unloaded(&state)?;
                state.cart = cart;
                state.loaded = true;
                info!(
                    "event=cart_load module=cart status=ok outcome=hydrated items={count} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(LoadOutcome::Hydrated(count))
            }
            Ok(None) => {
                lock_state(&self.state).loaded = true;
                info!(
                    "event=cart_load module=cart status=ok outcome=empty duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(LoadOutcome::Empty)
            }
            Err(err) => {
                error!(
                    "event=cart_load module=cart status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    /// Loads the stored cart, falling back to an empty one on bad data.
    ///
    /// Unreadable payloads are replaced by a queued write of the empty cart.
    /// Storage failures are still returned.
    pub fn load_or_reset(&self) -> CartResult<LoadOutcome> {
        match self.load() {
            Err(CartError::MalformedCart(_) | CartError::InvalidCart(_)) => {
                warn!("event=cart_reset module=cart status=ok reason=unreadable_payload");
                {
                    let mut state = lock_state(&self.state);
                    state.cart = Cart::new();
                    state.loaded = true;
                    state.version += 1;
                }
                self.send(WriterCommand::Persist)?;
                Ok(LoadOutcome::Empty)
            }
            other => other,
        }
    }

    /// Adds one unit of `item`; an existing id is incremented instead.
    ///
    /// Returns the cart snapshot after the change.
    pub fn add_to_cart(&self, item: NewLineItem) -> CartResult<Vec<LineItem>> {
        item.validate()?;
        let id = item.id.clone();
        self.mutate("cart_add", &id, |cart| cart.add(item))
    }

    /// Raises the quantity of `id` by one. Unknown ids still persist.
    pub fn increment(&self, id: &str) -> CartResult<Vec<LineItem>> {
        self.mutate("cart_increment", id, |cart| cart.increment(id))
    }

    /// Lowers the quantity of `id` by one, removing it at quantity 1.
    pub fn decrement(&self, id: &str) -> CartResult<Vec<LineItem>> {
        self.mutate("cart_decrement", id, |cart| cart.decrement(id))
    }

    /// Snapshot of the current items in add order.
    pub fn products(&self) -> Vec<LineItem> {
        lock_state(&self.state).cart.items().to_vec()
    }

    /// Sum of item quantities, for badge counts.
    pub fn total_quantity(&self) -> u64 {
        lock_state(&self.state).cart.total_quantity()
    }

    /// Blocks until every queued write is done and the latest cart is stored.
    ///
    /// A cart left dirty by an earlier failed write is written again first.
    ///
    /// # Errors
    /// Returns the first write failure since the previous flush, or
    /// `WriterStopped` when the queue is gone.
    pub fn flush(&self) -> CartResult<()> {
        let (reply, response) = mpsc::channel();
        self.send(WriterCommand::Flush { reply })?;
        match response.recv().map_err(|_| CartError::WriterStopped)? {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn mutate(
        &self,
        event: &str,
        id: &str,
        apply: impl FnOnce(&mut Cart) -> CartChange,
    ) -> CartResult<Vec<LineItem>> {
        let snapshot = {
            let mut state = lock_state(&self.state);
            let change = apply(&mut state.cart);
            state.version += 1;
            debug!(
                "event={event} module=cart status=ok product_id={id} change={change:?} items={} version={}",
                state.cart.len(),
                state.version
            );
            state.cart.items().to_vec()
        };
        self.send(WriterCommand::Persist)?;
        Ok(snapshot)
    }

    fn read_stored(&self) -> CartResult<Option<String>> {
        let (reply, response) = mpsc::channel();
        self.send(WriterCommand::Read { reply })?;
        let stored = response.recv().map_err(|_| CartError::WriterStopped)??;
        Ok(stored)
    }

    fn send(&self, command: WriterCommand) -> CartResult<()> {
        self.commands
            .as_ref()
            .ok_or(CartError::WriterStopped)?
            .send(command)
            .map_err(|_| CartError::WriterStopped)
    }
}

impl Drop for CartStore {
    fn drop(&mut self) {
        // Closing the channel lets the writer drain queued writes and exit.
        self.commands.take();
        if let Some(writer) = self.writer.take() {
            if writer.join().is_err() {
                error!("event=cart_writer_stop module=cart status=error error=writer_panicked");
            }
        }
    }
}

struct CartWriter<R> {
    repo: R,
    storage_key: String,
    state: Arc<Mutex<CartState>>,
    written_version: Option<u64>,
    pending_error: Option<CartError>,
}

impl<R: KeyValueRepository> CartWriter<R> {
    fn run(mut self, commands: Receiver<WriterCommand>) {
        debug!("event=cart_writer_start module=cart status=ok");
        for command in commands {
            match command {
                WriterCommand::Persist => self.write_latest(),
                WriterCommand::Read { reply } => {
                    let _ = reply.send(self.repo.get_item(&self.storage_key));
                }
                WriterCommand::Flush { reply } => {
                    self.write_latest();
                    let _ = reply.send(self.pending_error.take());
                }
            }
        }
        self.write_latest();
        match self.pending_error.take() {
            Some(err) => error!("event=cart_writer_stop module=cart status=error error={err}"),
            None => debug!("event=cart_writer_stop module=cart status=ok"),
        }
    }

    fn write_latest(&mut self) {
        let (version, payload) = {
            let state = lock_state(&self.state);
            if self.written_version == Some(state.version) {
                return;
            }
            (state.version, serde_json::to_string(&state.cart))
        };

        let result = payload
            .map_err(|err| CartError::Serialize(err.to_string()))
            .and_then(|payload| {
                self.repo
                    .set_item(&self.storage_key, &payload)
                    .map_err(CartError::from)
            });

        match result {
            Ok(()) => {
                self.written_version = Some(version);
                debug!("event=cart_persist module=cart status=ok version={version}");
            }
            Err(err) => {
                error!("event=cart_persist module=cart status=error version={version} error={err}");
                self.pending_error.get_or_insert(err);
            }
        }
    }
}

fn lock_state(state: &Mutex<CartState>) -> MutexGuard<'_, CartState> {
    // Every mutation assigns a fully computed cart, so a poisoned guard still
    // holds a consistent value.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn ensure_unloaded(state: &CartState) -> CartResult<()> {
    if state.loaded || state.version != 0 {
        return Err(CartError::AlreadyLoaded);
    }
    Ok(())
}

fn decode_cart(raw: &str) -> CartResult<Cart> {
    let items: Vec<LineItem> =
        serde_json::from_str(raw).map_err(|err| CartError::MalformedCart(err.to_string()))?;
    Ok(Cart::from_items(items)?)
}

//! In-memory key-value repository.
//!
//! Used for tests and development without a database file. Clones share the
//! same entries, so a test can keep a handle after moving one into a store.

use crate::repo::kv_repo::{KeyValueRepository, RepoError, RepoResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone, Default)]
pub struct MemoryKeyValueRepository {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl MemoryKeyValueRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `set_item`/`remove_item` fail until switched off.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every later `get_item` fail until switched off.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `set_item` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn entries(&self) -> RepoResult<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| RepoError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn check_writable(&self) -> RepoResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepoError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

impl KeyValueRepository for MemoryKeyValueRepository {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepoError::Unavailable("reads disabled".to_string()));
        }
        Ok(self.entries()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> RepoResult<()> {
        self.check_writable()?;
        self.entries()?.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> RepoResult<()> {
        self.check_writable()?;
        self.entries()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKeyValueRepository;
    use crate::repo::kv_repo::{KeyValueRepository, RepoError};

    #[test]
    fn clones_share_entries() {
        let repo = MemoryKeyValueRepository::new();
        let handle = repo.clone();

        repo.set_item("k", "v").unwrap();
        assert_eq!(handle.get_item("k").unwrap().as_deref(), Some("v"));
        assert_eq!(handle.write_count(), 1);
    }

    #[test]
    fn injected_failure_blocks_writes_but_not_reads() {
        let repo = MemoryKeyValueRepository::new();
        repo.set_item("k", "v").unwrap();
        repo.set_fail_writes(true);

        let err = repo.set_item("k", "w").unwrap_err();
        assert!(matches!(err, RepoError::Unavailable(_)));
        assert_eq!(repo.get_item("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn injected_read_failure_keeps_entries() {
        let repo = MemoryKeyValueRepository::new();
        repo.set_item("k", "v").unwrap();
        repo.set_fail_reads(true);
        assert!(matches!(repo.get_item("k"), Err(RepoError::Unavailable(_))));

        repo.set_fail_reads(false);
        assert_eq!(repo.get_item("k").unwrap().as_deref(), Some("v"));
    }
}

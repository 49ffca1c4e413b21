//! Pluggable byte storage behind the coverage cache.
//!
//! The cache requires nothing but keyed byte get/put, so any object store, database blob
//! table, or filesystem can back it. Two implementations ship with the crate: a
//! mutex-guarded in-memory map for single-process deployments and tests, and a no-op store
//! that never retains anything.

use std::collections::HashMap;
use std::sync::Mutex;

use ahash::RandomState;
use thiserror::Error;

/// Failure of a storage backend. The cache treats every variant as a miss.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Keyed byte storage.
///
/// Implementations may be remote; latency and failure are expected and handled fail-open by
/// the caller. `put` overwrites silently: concurrent writers of the same key are
/// last-write-wins, which is safe because identical keys hold identical deterministic
/// content.
pub trait ByteStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;
}

/// In-memory store backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>, RandomState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ByteStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Backend("poisoned memory store lock".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StoreError::Backend("poisoned memory store lock".to_string()))?;
        entries.insert(key.to_string(), bytes);
        Ok(())
    }
}

/// Store that never retains anything: every get is a miss, every put is accepted and dropped.
///
/// Useful to disable memoization without touching the composition root, and as a baseline in
/// cache behaviour tests.
#[derive(Debug, Clone, Default)]
pub struct NoOpStore;

impl NoOpStore {
    pub fn new() -> Self {
        NoOpStore
    }
}

impl ByteStore for NoOpStore {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(None)
    }

    fn put(&self, _key: &str, _bytes: Vec<u8>) -> Result<(), StoreError> {
        Ok(())
    }
}

//! # Memoization of computed coverage series
//!
//! Projecting and pixel-indexing every footprint of a long pointing sequence is the expensive
//! part of a coverage request, and the inputs change rarely between requests for the same
//! event. This module memoizes complete computed series behind a fingerprint of all
//! coverage-affecting inputs ([`crate::cache::key::CoverageKey`]).
//!
//! ## Discipline
//!
//! * The cache stores **complete** series only; a failed computation stores nothing.
//! * Entries are never invalidated automatically. New pointings or a replaced skymap change
//!   the fingerprint and land on a fresh key; stale entries for superseded keys linger until
//!   the backing store evicts them.
//! * Every backend failure (unreachable store, undecodable payload) is treated as a miss:
//!   the engine recomputes rather than failing the request.
//! * Two concurrent computations of the same key may both compute and both write. Last write
//!   wins, which is safe because the computation is deterministic and side-effect-free for
//!   identical inputs.

pub mod key;
pub mod store;

use hifitime::Epoch;
use serde::{Deserialize, Serialize};

use crate::cache::key::CoverageKey;
use crate::cache::store::{ByteStore, MemoryStore};
use crate::coverage::report::CoverageSample;

/// Stored form of one memoized series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub samples: Vec<CoverageSample>,
    /// When the entry was computed. `None` when the system clock was unavailable.
    pub created_at: Option<Epoch>,
}

/// Fingerprint-addressed, fail-open memoization facade over a [`ByteStore`].
pub struct CoverageCache {
    store: Box<dyn ByteStore>,
}

impl CoverageCache {
    pub fn new(store: Box<dyn ByteStore>) -> Self {
        CoverageCache { store }
    }

    /// Cache backed by an in-process map; the default composition for single-node deployments.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    /// Look up a memoized series.
    ///
    /// Return
    /// ------
    /// * `Some(samples)` on a hit; `None` on a miss **or** on any backend/decoding failure
    ///   (logged and recomputed by the caller, never surfaced as an error).
    pub fn get(&self, key: &CoverageKey) -> Option<Vec<CoverageSample>> {
        let fingerprint = key.fingerprint();
        let bytes = match self.store.get(&fingerprint) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(err) => {
                log::warn!("coverage cache read failed for {fingerprint}: {err}");
                return None;
            }
        };
        match serde_json::from_slice::<CacheEntry>(&bytes) {
            Ok(entry) => Some(entry.samples),
            Err(err) => {
                log::warn!("coverage cache entry undecodable for {fingerprint}: {err}");
                None
            }
        }
    }

    /// Memoize a complete computed series.
    ///
    /// Fail-open like [`get`](CoverageCache::get): a backend refusal costs a recomputation on
    /// the next request, never a failure of this one.
    pub fn put(&self, key: &CoverageKey, samples: &[CoverageSample]) {
        let entry = CacheEntry {
            samples: samples.to_vec(),
            created_at: Epoch::now().ok(),
        };
        let fingerprint = key.fingerprint();
        let bytes = match serde_json::to_vec(&entry) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("coverage cache entry unencodable for {fingerprint}: {err}");
                return;
            }
        };
        if let Err(err) = self.store.put(&fingerprint, bytes) {
            log::warn!("coverage cache write failed for {fingerprint}: {err}");
        }
    }
}

#[cfg(test)]
mod cache_test {
    use super::*;
    use crate::cache::store::{NoOpStore, StoreError};
    use crate::constants::ApproximationMap;
    use crate::coverage::pointing::Pointing;
    use crate::selection::PointingFilters;

    fn test_key() -> CoverageKey {
        let pointings = [Pointing::new(
            1,
            180.0,
            0.0,
            None,
            Epoch::from_gregorian_utc(2024, 5, 17, 12, 0, 0, 0),
            1,
        )];
        CoverageKey::new(
            "S240517a",
            "maps/0.fits",
            &pointings,
            &PointingFilters::default(),
            &ApproximationMap::default(),
            512,
        )
    }

    fn test_samples() -> Vec<CoverageSample> {
        vec![
            CoverageSample {
                elapsed_hours: 1.5,
                cumulative_probability: 0.25,
                cumulative_area_deg2: 4.0,
            },
            CoverageSample {
                elapsed_hours: 3.0,
                cumulative_probability: 0.4,
                cumulative_area_deg2: 7.5,
            },
        ]
    }

    #[test]
    fn test_round_trip() {
        let cache = CoverageCache::in_memory();
        let key = test_key();
        assert_eq!(cache.get(&key), None);

        let samples = test_samples();
        cache.put(&key, &samples);
        assert_eq!(cache.get(&key), Some(samples));
    }

    #[test]
    fn test_noop_store_never_hits() {
        let cache = CoverageCache::new(Box::new(NoOpStore::new()));
        let key = test_key();
        cache.put(&key, &test_samples());
        assert_eq!(cache.get(&key), None);
    }

    #[test]
    fn test_backend_failure_is_a_miss() {
        struct FailingStore;
        impl ByteStore for FailingStore {
            fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
                Err(StoreError::Backend("unreachable".to_string()))
            }
            fn put(&self, _key: &str, _bytes: Vec<u8>) -> Result<(), StoreError> {
                Err(StoreError::Backend("unreachable".to_string()))
            }
        }

        let cache = CoverageCache::new(Box::new(FailingStore));
        let key = test_key();
        cache.put(&key, &test_samples());
        assert_eq!(cache.get(&key), None);
    }

    #[test]
    fn test_undecodable_entry_is_a_miss() {
        let store = MemoryStore::new();
        store.put(&test_key().fingerprint(), b"not json".to_vec()).unwrap();
        let cache = CoverageCache::new(Box::new(store));
        assert_eq!(cache.get(&test_key()), None);
    }
}

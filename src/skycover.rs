//! # SkyCover: the memoizing coverage facade
//!
//! This module defines the [`SkyCover`](crate::skycover::SkyCover) struct, the central facade
//! that wires together:
//!
//! 1. **Skymap loading** — [`Skymap::from_bytes`](crate::skymap::Skymap::from_bytes) over the
//!    payload fetched by the storage collaborator.
//! 2. **Coverage accumulation** — [`CoverageAccumulator`](crate::coverage::CoverageAccumulator)
//!    over the caller-ordered pointing sequence.
//! 3. **Memoization** — [`CoverageCache`](crate::cache::CoverageCache) addressed by a
//!    fingerprint of every coverage-affecting input.
//!
//! The facade consults the cache first, computes on a miss, stores the complete series, and
//! reports whether the result was memoized. The computation itself is synchronous,
//! single-threaded, and a pure function of the request: two concurrent requests for the same
//! fingerprint may both compute and both write, safely.
//!
//! ## Typical usage
//!
//! ```rust,no_run
//! use hifitime::Epoch;
//! use skycover::constants::FootprintLookup;
//! use skycover::coverage::CoverageParams;
//! use skycover::skycover::{CoverageRequest, SkyCover};
//!
//! let engine = SkyCover::in_memory();
//! let params = CoverageParams::builder().coarse_nside(512).build().unwrap();
//!
//! # let (skymap_bytes, pointings, footprints): (Vec<u8>, Vec<skycover::coverage::pointing::Pointing>, FootprintLookup) = unimplemented!();
//! let request = CoverageRequest {
//!     event_id: "S240517a",
//!     skymap_ref: "maps/S240517a/bayestar.skymap",
//!     skymap_bytes: &skymap_bytes,
//!     trigger_time: Epoch::from_gregorian_utc(2024, 5, 17, 12, 0, 0, 0),
//!     pointings: &pointings,
//!     footprints: &footprints,
//! };
//! let outcome = engine.compute_coverage(&request, &params).unwrap();
//! println!("{} samples, cached: {}", outcome.samples.len(), outcome.cached);
//! ```
//!
//! ## See also
//! ------------
//! * [`crate::projection::project_footprint`] – standalone projection for visualization use.
//! * [`crate::cache::key::CoverageKey`] – the fingerprint addressing the cache.

use hifitime::Epoch;

use crate::cache::key::CoverageKey;
use crate::cache::CoverageCache;
use crate::constants::FootprintLookup;
use crate::coverage::pointing::Pointing;
use crate::coverage::report::{CoverageSample, CoverageWarning};
use crate::coverage::{CoverageAccumulator, CoverageParams};
use crate::skycover_errors::SkyCoverError;
use crate::skymap::Skymap;

/// One coverage request, assembled by the caller from the persistence collaborators
/// (`download_bytes`, `list_pointings_for_event`, `get_footprints`, `get_trigger_time`).
#[derive(Debug, Clone)]
pub struct CoverageRequest<'a> {
    /// Identifier of the triggering event.
    pub event_id: &'a str,
    /// Stable reference to the skymap payload (e.g. its storage path), fingerprint material.
    pub skymap_ref: &'a str,
    /// The skymap payload itself.
    pub skymap_bytes: &'a [u8],
    /// Reference epoch for elapsed-time calculations.
    pub trigger_time: Epoch,
    /// Observations in accumulation order; the engine does not re-sort.
    pub pointings: &'a [Pointing],
    /// Stored geometry text per instrument.
    pub footprints: &'a FootprintLookup,
}

/// What the caller gets back: a complete monotonic series, the skipped-pointing record, and
/// whether the series came out of the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageOutcome {
    pub samples: Vec<CoverageSample>,
    /// Empty on cache hits: warnings describe a computation, and hits do not compute.
    pub warnings: Vec<CoverageWarning>,
    pub cached: bool,
}

/// Central facade over cache and engine.
pub struct SkyCover {
    cache: CoverageCache,
}

impl SkyCover {
    /// Wire the facade to an explicit cache. Which [`ByteStore`](crate::cache::store::ByteStore)
    /// backs it is a composition-root choice.
    pub fn new(cache: CoverageCache) -> Self {
        SkyCover { cache }
    }

    /// Facade with an in-process memoization store.
    pub fn in_memory() -> Self {
        SkyCover {
            cache: CoverageCache::in_memory(),
        }
    }

    /// Compute (or recall) the coverage time series of an event.
    ///
    /// Arguments
    /// ---------
    /// * `request`: the event's skymap, trigger time, pointing sequence, and geometry lookup.
    /// * `params`: coarse grid resolution, approximation shapes, and recorded filters.
    ///
    /// Return
    /// ------
    /// * A [`CoverageOutcome`] with one sample per accumulated pointing, or a fatal
    ///   [`SkyCoverError`] (unavailable/malformed skymap, invalid parameters) with no
    ///   partial output.
    pub fn compute_coverage(
        &self,
        request: &CoverageRequest<'_>,
        params: &CoverageParams,
    ) -> Result<CoverageOutcome, SkyCoverError> {
        let key = CoverageKey::new(
            request.event_id,
            request.skymap_ref,
            request.pointings,
            &params.filters,
            &params.approximations,
            params.coarse_nside,
        );

        if let Some(samples) = self.cache.get(&key) {
            return Ok(CoverageOutcome {
                samples,
                warnings: Vec::new(),
                cached: true,
            });
        }

        let skymap = Skymap::from_bytes(request.skymap_bytes)?;
        let accumulator = CoverageAccumulator::new(&skymap, request.trigger_time, params)?;
        let report = accumulator.accumulate(request.pointings, request.footprints)?;

        self.cache.put(&key, &report.samples);

        Ok(CoverageOutcome {
            samples: report.samples,
            warnings: report.warnings,
            cached: false,
        })
    }
}

//! # Probabilistic sky-coverage accumulation
//!
//! This module orchestrates footprint parsing, spherical projection, and HEALPix indexing
//! over a time-ordered sequence of pointings, producing one
//! [`CoverageSample`](crate::coverage::report::CoverageSample) per accumulated observation.
//!
//! ## Per-pointing algorithm
//!
//! Strictly in input order (the engine never re-sorts):
//!
//! 1. Resolve the footprint: the caller-supplied approximation map is consulted first, then
//!    the per-instrument geometry lookup. Geometry text is parsed once per instrument per
//!    accumulation.
//! 2. Project every polygon of the resolved footprint and query its pixel set twice: at the
//!    skymap's native resolution for probability, and at the fixed coarse resolution for
//!    area. Both queries are inclusive, keeping partially overlapping boundary pixels.
//! 3. Union the pixel sets into two persistent running sets carried across the whole
//!    sequence. Re-adding an already-seen pixel is a no-op; the running probability sum is
//!    updated only with freshly inserted pixels, so the total work over n pointings is O(n)
//!    set inserts, never a per-step rebuild of the accumulated history.
//! 4. Emit the sample: elapsed hours since trigger (negative for pre-trigger archival
//!    pointings), unclamped cumulative probability, and deduplicated area.
//!
//! ## Failure modes
//!
//! A missing or unparseable skymap is fatal to the whole computation and yields no partial
//! result. A single pointing whose footprint is missing or malformed is skipped with a
//! recorded [`CoverageWarning`](crate::coverage::report::CoverageWarning) (and a
//! `log::warn!`); the remaining sequence still accumulates. The accumulator carries no state
//! between invocations: each call is a pure function of its explicit inputs.
//!
//! ## See also
//! ------------
//! * [`crate::skycover`] – the memoizing facade wrapping this engine.
//! * [`crate::cache`] – fingerprint-addressed storage of computed series.

pub mod pointing;
pub mod report;

use ahash::AHashMap;
use hifitime::Epoch;

use crate::constants::{
    ApproximationMap, FootprintLookup, InstrumentId, PixelSet, DEFAULT_AREA_NSIDE, MAX_NSIDE,
};
use crate::coverage::pointing::Pointing;
use crate::coverage::report::{CoverageReport, CoverageSample, CoverageWarning, SkipReason};
use crate::footprint::{parse_footprint, Footprint};
use crate::projection::project_footprint;
use crate::selection::PointingFilters;
use crate::skycover_errors::SkyCoverError;
use crate::skymap::{area_per_pixel, pixels_in_polygon, Skymap};

/// Tunable inputs of one coverage computation.
///
/// Everything here affects the computed series and therefore also enters the cache
/// fingerprint. Defaults match the production configuration: a coarse area grid at nside 512,
/// no approximation shapes, no upstream selection filters.
#[derive(Debug, Clone)]
pub struct CoverageParams {
    /// Resolution of the deduplicated area grid, independent of the skymap's native nside.
    pub coarse_nside: u32,
    /// Instruments flagged as using a coarser stand-in shape, with their substitutes.
    pub approximations: ApproximationMap,
    /// Upstream selection criteria recorded for fingerprinting.
    pub filters: PointingFilters,
}

impl CoverageParams {
    /// Construct parameters with the default configuration.
    pub fn new() -> Self {
        CoverageParams {
            coarse_nside: DEFAULT_AREA_NSIDE,
            approximations: ApproximationMap::default(),
            filters: PointingFilters::default(),
        }
    }

    /// Create a new [`CoverageParamsBuilder`] to configure custom parameters.
    pub fn builder() -> CoverageParamsBuilder {
        CoverageParamsBuilder::new()
    }
}

impl Default for CoverageParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`CoverageParams`], with validation.
#[derive(Debug, Clone)]
pub struct CoverageParamsBuilder {
    params: CoverageParams,
}

impl Default for CoverageParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CoverageParamsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        CoverageParamsBuilder {
            params: CoverageParams::new(),
        }
    }

    pub fn coarse_nside(mut self, coarse_nside: u32) -> Self {
        self.params.coarse_nside = coarse_nside;
        self
    }

    pub fn approximations(mut self, approximations: ApproximationMap) -> Self {
        self.params.approximations = approximations;
        self
    }

    pub fn filters(mut self, filters: PointingFilters) -> Self {
        self.params.filters = filters;
        self
    }

    /// Validate and return the parameters.
    pub fn build(self) -> Result<CoverageParams, SkyCoverError> {
        let nside = self.params.coarse_nside;
        if !nside.is_power_of_two() || nside > MAX_NSIDE {
            return Err(SkyCoverError::InvalidParameter(format!(
                "coarse nside {nside} is not a power of two within the supported range"
            )));
        }
        Ok(self.params)
    }
}

/// One-shot coverage computation over an explicit input set.
///
/// Borrows the loaded skymap and the request parameters; owns nothing and carries no state
/// between invocations of [`accumulate`](CoverageAccumulator::accumulate).
#[derive(Debug)]
pub struct CoverageAccumulator<'a> {
    skymap: &'a Skymap,
    trigger_time: Epoch,
    coarse_nside: u32,
    approximations: &'a ApproximationMap,
}

impl<'a> CoverageAccumulator<'a> {
    /// Wire an accumulator to a loaded skymap and a validated parameter set.
    ///
    /// Arguments
    /// ---------
    /// * `skymap`: the event's probability map, already loaded.
    /// * `trigger_time`: reference epoch for elapsed-time calculations.
    /// * `params`: coarse grid resolution and approximation shapes.
    ///
    /// Return
    /// ------
    /// * The accumulator, or [`SkyCoverError::InvalidParameter`] when the coarse resolution
    ///   is not a power of two (possible when `params` was assembled by hand rather than
    ///   through the builder).
    pub fn new(
        skymap: &'a Skymap,
        trigger_time: Epoch,
        params: &'a CoverageParams,
    ) -> Result<Self, SkyCoverError> {
        if !params.coarse_nside.is_power_of_two() || params.coarse_nside > MAX_NSIDE {
            return Err(SkyCoverError::InvalidParameter(format!(
                "coarse nside {} is not a power of two within the supported range",
                params.coarse_nside
            )));
        }
        Ok(CoverageAccumulator {
            skymap,
            trigger_time,
            coarse_nside: params.coarse_nside,
            approximations: &params.approximations,
        })
    }

    /// Accumulate a pointing sequence into a coverage time series.
    ///
    /// Arguments
    /// ---------
    /// * `pointings`: observations in accumulation order.
    /// * `footprints`: stored geometry text per instrument.
    ///
    /// Return
    /// ------
    /// * The complete [`CoverageReport`], or a fatal [`SkyCoverError`]. Skipped pointings
    ///   emit no sample; they are recorded in the report's warnings list.
    pub fn accumulate(
        &self,
        pointings: &[Pointing],
        footprints: &FootprintLookup,
    ) -> Result<CoverageReport, SkyCoverError> {
        let resolved = self.resolve_footprints(pointings, footprints);

        let mut prob_pixels = PixelSet::default();
        let mut area_pixels = PixelSet::default();
        let mut prob_sum = 0.0;
        let mut samples = Vec::with_capacity(pointings.len());
        let mut warnings = Vec::new();
        let mut fresh: Vec<u64> = Vec::new();

        for pointing in pointings {
            let footprint = match resolved.get(&pointing.instrument) {
                Some(Ok(footprint)) => footprint,
                Some(Err(reason)) => {
                    log::warn!(
                        "skipping pointing {} (instrument {}): {reason}",
                        pointing.id,
                        pointing.instrument
                    );
                    warnings.push(CoverageWarning {
                        pointing: pointing.id,
                        instrument: pointing.instrument,
                        reason: reason.clone(),
                    });
                    continue;
                }
                None => {
                    // resolve_footprints visits every instrument in the sequence, so this
                    // only triggers on an inconsistent caller-supplied lookup.
                    warnings.push(CoverageWarning {
                        pointing: pointing.id,
                        instrument: pointing.instrument,
                        reason: SkipReason::MissingFootprint(pointing.instrument),
                    });
                    continue;
                }
            };

            for polygon in &footprint.polygons {
                let projected = project_footprint(
                    polygon,
                    pointing.center_ra,
                    pointing.center_dec,
                    pointing.position_angle,
                );

                fresh.clear();
                for pixel in pixels_in_polygon(projected.ring(), self.skymap.nside(), true)? {
                    if prob_pixels.insert(pixel) {
                        fresh.push(pixel);
                    }
                }
                prob_sum += self.skymap.probability_of_pixels(fresh.iter())?;

                area_pixels.extend(pixels_in_polygon(projected.ring(), self.coarse_nside, true)?);
            }

            samples.push(CoverageSample {
                elapsed_hours: pointing.elapsed_hours(self.trigger_time),
                cumulative_probability: prob_sum,
                cumulative_area_deg2: area_pixels.len() as f64
                    * area_per_pixel(self.coarse_nside),
            });
        }

        Ok(CoverageReport { samples, warnings })
    }

    /// Resolve the footprint of every instrument appearing in the sequence, once each.
    ///
    /// The approximation map takes precedence over the stored geometry; instruments with no
    /// registered geometry or unparseable geometry resolve to a [`SkipReason`].
    fn resolve_footprints(
        &self,
        pointings: &[Pointing],
        lookup: &FootprintLookup,
    ) -> AHashMap<InstrumentId, Result<Footprint, SkipReason>> {
        let mut resolved = AHashMap::new();
        for pointing in pointings {
            let instrument = pointing.instrument;
            if resolved.contains_key(&instrument) {
                continue;
            }
            let footprint = if let Some(substitute) = self.approximations.get(&instrument) {
                Ok(substitute.clone())
            } else {
                match lookup.get(&instrument) {
                    Some(raw) => parse_footprint(instrument, raw).map_err(SkipReason::from),
                    None => Err(SkipReason::MissingFootprint(instrument)),
                }
            };
            resolved.insert(instrument, footprint);
        }
        resolved
    }
}

#[cfg(test)]
mod coverage_params_test {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = CoverageParams::new();
        assert_eq!(params.coarse_nside, DEFAULT_AREA_NSIDE);
        assert!(params.approximations.is_empty());
    }

    #[test]
    fn test_builder_rejects_non_power_of_two() {
        let result = CoverageParams::builder().coarse_nside(500).build();
        assert!(matches!(result, Err(SkyCoverError::InvalidParameter(_))));
    }

    #[test]
    fn test_builder_accepts_overrides() {
        let params = CoverageParams::builder().coarse_nside(1024).build().unwrap();
        assert_eq!(params.coarse_nside, 1024);
    }
}

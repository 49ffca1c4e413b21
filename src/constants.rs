//! # Constants and type definitions for skycover
//!
//! This module centralizes the **angular constants**, **conversion factors**, and **common type
//! definitions** used throughout the `skycover` library. It also defines the container types
//! used to hand instrument geometry to the coverage engine.
//!
//! ## Overview
//!
//! - Angular constants and unit conversions (degrees ↔ radians, sphere area)
//! - Core type aliases used across the crate
//! - Identifiers for instruments and pointings
//! - Lookup containers for footprint geometry and approximation shapes
//!
//! These definitions are used by all main modules, including projection, skymap indexing,
//! and coverage accumulation.

use crate::footprint::Footprint;
use ahash::{AHashSet, RandomState};
use std::collections::HashMap;

// -------------------------------------------------------------------------------------------------
// Angular constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Number of seconds in an hour
pub const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Total area of the celestial sphere in square degrees (4π sr × (180/π)²)
pub const FULL_SKY_DEG2: f64 = 129_600.0 / std::f64::consts::PI;

/// Numerical epsilon used for floating-point comparisons on angles in degrees
pub const EPS: f64 = 1e-9;

/// Default HEALPix resolution of the deduplicated area grid.
///
/// The area grid is independent of the probability skymap's native resolution and is
/// typically finer, so the observed area stays fine-grained even against coarse maps.
pub const DEFAULT_AREA_NSIDE: u32 = 512;

/// Largest HEALPix nside addressable by the pixelization backend (depth 29)
pub const MAX_NSIDE: u32 = 1 << 29;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Solid angle in square degrees
pub type SquareDegree = f64;
/// Elapsed time in hours
pub type Hour = f64;

/// Stable identifier of an instrument, assigned by the persistence layer
pub type InstrumentId = u32;
/// Stable identifier of a pointing, assigned by the persistence layer
pub type PointingId = u64;
/// HEALPix pixel index (nested ordering)
pub type HealpixPixel = u64;

/// A deduplicated set of HEALPix pixel indices.
///
/// Uses [`ahash`](https://docs.rs/ahash) for fast hashing; the coverage engine mutates one of
/// these incrementally per pointing instead of rebuilding it from the accumulated history.
pub type PixelSet = AHashSet<HealpixPixel>;

// -------------------------------------------------------------------------------------------------
// Geometry containers
// -------------------------------------------------------------------------------------------------

/// Lookup table from instrument identifier to its stored footprint geometry text.
///
/// Each entry holds one `POLYGON((...))` string per detector polygon; multi-CCD mosaics
/// own several disjoint polygons whose pixel contributions are unioned downstream.
pub type FootprintLookup = HashMap<InstrumentId, Vec<String>, RandomState>;

/// Caller-supplied substitution table for instruments flagged as using a coarser
/// stand-in shape for performance. Consulted before the stored geometry.
pub type ApproximationMap = HashMap<InstrumentId, Footprint, RandomState>;

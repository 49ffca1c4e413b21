//! # HEALPix probability skymap indexing
//!
//! This module wraps a HEALPix-indexed posterior probability map and the pixelization queries
//! the coverage engine runs against it.
//!
//! ## Map format
//!
//! A skymap payload is a flat array of little-endian `f64` per-pixel probability densities in
//! **nested** HEALPix ordering. The pixel count must equal `12 * nside^2` for a power-of-two
//! `nside`; anything else is rejected as [`SkyCoverError::SkymapFormat`]. An empty payload is
//! reported as [`SkyCoverError::MapUnavailable`] so the caller can distinguish "no map" from
//! "broken map". The map is loaded once per computation and read-only afterwards.
//!
//! ## Pixelization queries
//!
//! Polygon containment is delegated to the
//! [`cdshealpix`](https://docs.rs/cdshealpix) nested-scheme coverage routine.
//! `inclusive = true` keeps boundary pixels that only partially overlap the polygon, a
//! deliberate conservative over-coverage bias the engine relies on. Queries accept any
//! power-of-two resolution, independent of a loaded map's own `nside`, so the same routine
//! serves both the probability grid and the finer deduplicated area grid.
//!
//! ## See also
//! ------------
//! * [`crate::projection`] – produces the sky-frame rings queried here.
//! * [`crate::coverage`] – unions the returned pixel sets across a pointing sequence.

use cdshealpix::nested;

use crate::constants::{HealpixPixel, PixelSet, SquareDegree, FULL_SKY_DEG2, MAX_NSIDE, RADEG};
use crate::footprint::Vertex;
use crate::skycover_errors::SkyCoverError;

/// A loaded HEALPix probability map.
#[derive(Debug, Clone)]
pub struct Skymap {
    nside: u32,
    prob: Vec<f64>,
}

impl Skymap {
    /// Parse a skymap payload.
    ///
    /// Arguments
    /// ---------
    /// * `bytes`: little-endian `f64` densities, nested ordering.
    ///
    /// Return
    /// ------
    /// * The loaded [`Skymap`], [`SkyCoverError::MapUnavailable`] for an empty payload, or
    ///   [`SkyCoverError::SkymapFormat`] when the byte length is not a whole number of pixels
    ///   or the pixel count is not `12 * nside^2` for any power-of-two `nside`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SkyCoverError> {
        if bytes.is_empty() {
            return Err(SkyCoverError::MapUnavailable(
                "empty skymap payload".to_string(),
            ));
        }
        if bytes.len() % 8 != 0 {
            return Err(SkyCoverError::SkymapFormat(format!(
                "payload length {} is not a whole number of f64 pixels",
                bytes.len()
            )));
        }

        let npix = bytes.len() / 8;
        let nside = nside_for_npix(npix)?;

        let prob = bytes
            .chunks_exact(8)
            .map(|chunk| f64::from_le_bytes(chunk.try_into().unwrap()))
            .collect();

        Ok(Skymap { nside, prob })
    }

    /// Native resolution of the map.
    pub fn nside(&self) -> u32 {
        self.nside
    }

    /// Number of pixels, `12 * nside^2`.
    pub fn npix(&self) -> usize {
        self.prob.len()
    }

    /// Sum the map's density values over a set of (deduplicated) pixel indices.
    ///
    /// The sum is **not** clamped to 1: an unnormalized map shows unnormalized sums.
    ///
    /// Arguments
    /// ---------
    /// * `pixels`: pixel indices at the map's native resolution. Callers pass either a whole
    ///   running [`PixelSet`] or just the freshly inserted indices of one accumulation step.
    ///
    /// Return
    /// ------
    /// * The density sum, or [`SkyCoverError::PixelOutOfRange`] for an index outside the map.
    ///   Out-of-range indices are structurally impossible when the query `nside` matches the
    ///   map, so this error indicates a resolution mix-up upstream.
    pub fn probability_of_pixels<'a, I>(&self, pixels: I) -> Result<f64, SkyCoverError>
    where
        I: IntoIterator<Item = &'a HealpixPixel>,
    {
        let mut sum = 0.0;
        for &pixel in pixels {
            let density = self
                .prob
                .get(pixel as usize)
                .ok_or(SkyCoverError::PixelOutOfRange {
                    index: pixel,
                    npix: self.prob.len(),
                })?;
            sum += density;
        }
        Ok(sum)
    }
}

/// Infer and validate the `nside` of a map with `npix` pixels.
fn nside_for_npix(npix: usize) -> Result<u32, SkyCoverError> {
    let invalid = || {
        SkyCoverError::SkymapFormat(format!(
            "pixel count {npix} is not 12 * nside^2 for any power-of-two nside"
        ))
    };

    if npix == 0 || npix % 12 != 0 {
        return Err(invalid());
    }
    let nside = ((npix / 12) as f64).sqrt().round() as u32;
    if nside == 0
        || !nside.is_power_of_two()
        || nside > MAX_NSIDE
        || 12 * (nside as usize) * (nside as usize) != npix
    {
        return Err(invalid());
    }
    Ok(nside)
}

/// Convert a sky polygon into the set of HEALPix pixels it covers.
///
/// Arguments
/// ---------
/// * `ring`: sky-frame `(ra, dec)` vertices in degrees; a closing repeat of the first vertex
///   is stripped before querying.
/// * `nside`: requested power-of-two resolution, independent of any loaded map.
/// * `inclusive`: when `true`, boundary pixels that only partially overlap the polygon are
///   still included (conservative over-coverage); when `false`, only fully covered pixels.
///
/// Return
/// ------
/// * The deduplicated pixel set, or [`SkyCoverError::InvalidParameter`] for an unsupported
///   resolution.
pub fn pixels_in_polygon(
    ring: &[Vertex],
    nside: u32,
    inclusive: bool,
) -> Result<PixelSet, SkyCoverError> {
    if !nside.is_power_of_two() || nside > MAX_NSIDE {
        return Err(SkyCoverError::InvalidParameter(format!(
            "nside {nside} is not a power of two within the supported range"
        )));
    }
    let depth = nside.trailing_zeros() as u8;

    let open_ring = if ring.len() >= 2 && ring.first() == ring.last() {
        &ring[..ring.len() - 1]
    } else {
        ring
    };
    let vertices_rad: Vec<(f64, f64)> = open_ring
        .iter()
        .map(|&(ra, dec)| (ra * RADEG, dec * RADEG))
        .collect();

    let coverage = nested::polygon_coverage(depth, &vertices_rad, true);
    let pixels = if inclusive {
        coverage.flat_iter().collect()
    } else {
        coverage
            .flat_iter_cell()
            .filter(|cell| cell.is_full)
            .map(|cell| cell.hash)
            .collect()
    };
    Ok(pixels)
}

/// Constant pixel area in square degrees for a given resolution.
///
/// Independent of any loaded map: HEALPix pixels are equal-area by construction.
pub fn area_per_pixel(nside: u32) -> SquareDegree {
    FULL_SKY_DEG2 / (12.0 * nside as f64 * nside as f64)
}

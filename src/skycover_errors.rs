use thiserror::Error;

use crate::footprint::MalformedGeometryError;

/// Central error type of the coverage engine.
///
/// Per-pointing geometry failures are recoverable and surfaced through the warnings list of a
/// [`CoverageReport`](crate::coverage::CoverageReport); every variant here is fatal to the
/// request that raised it and produces no partial numeric output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkyCoverError {
    #[error("Malformed footprint geometry: {0}")]
    MalformedGeometry(#[from] MalformedGeometryError),

    #[error("Invalid skymap format: {0}")]
    SkymapFormat(String),

    #[error("Probability skymap unavailable: {0}")]
    MapUnavailable(String),

    #[error("Pixel index {index} outside map range (npix = {npix})")]
    PixelOutOfRange { index: u64, npix: usize },

    #[error("Invalid coverage parameter: {0}")]
    InvalidParameter(String),
}

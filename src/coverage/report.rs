use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{Hour, InstrumentId, PointingId, SquareDegree};
use crate::footprint::MalformedGeometryError;

/// One point of the coverage time series, emitted per accumulated pointing.
///
/// Both cumulative fields are non-decreasing across a sequence: re-observing already covered
/// pixels adds nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageSample {
    /// Hours since the event trigger; negative for pre-trigger archival pointings.
    pub elapsed_hours: Hour,
    /// Sum of map densities over every probability pixel observed so far. Not clamped to 1.
    pub cumulative_probability: f64,
    /// Deduplicated observed area on the coarse grid, in square degrees.
    pub cumulative_area_deg2: SquareDegree,
}

/// Why a pointing was dropped from the accumulated series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipReason {
    #[error("no footprint geometry registered for instrument {0}")]
    MissingFootprint(InstrumentId),

    #[error(transparent)]
    MalformedGeometry(#[from] MalformedGeometryError),
}

/// Record of a skipped pointing, surfaced alongside the computed samples.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageWarning {
    pub pointing: PointingId,
    pub instrument: InstrumentId,
    pub reason: SkipReason,
}

/// Complete result of one accumulation: the time series plus the skipped-pointing record.
///
/// Either the whole report is produced or the computation fails; there is no partial series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoverageReport {
    pub samples: Vec<CoverageSample>,
    pub warnings: Vec<CoverageWarning>,
}

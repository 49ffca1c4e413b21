use hifitime::{Epoch, Unit};

use crate::constants::{Degree, Hour, InstrumentId, PointingId};

/// A single telescope observation: where an instrument was pointed, and when.
///
/// Created by the persistence layer and immutable for the duration of a coverage computation.
/// The caller supplies pointings in the order they should be accumulated (conventionally
/// time-ascending); the engine never re-sorts them.
#[derive(Debug, Clone, PartialEq)]
pub struct Pointing {
    pub id: PointingId,
    pub center_ra: Degree,
    pub center_dec: Degree,
    /// Rotation of the detector plane relative to sky north, in degrees. Defaults to 0.
    pub position_angle: Degree,
    /// UTC instant of the observation.
    pub time: Epoch,
    pub instrument: InstrumentId,
}

impl Pointing {
    pub fn new(
        id: PointingId,
        center_ra: Degree,
        center_dec: Degree,
        position_angle: Option<Degree>,
        time: Epoch,
        instrument: InstrumentId,
    ) -> Self {
        Pointing {
            id,
            center_ra,
            center_dec,
            position_angle: position_angle.unwrap_or(0.0),
            time,
            instrument,
        }
    }

    /// Hours elapsed since the event trigger.
    ///
    /// Negative for pre-trigger archival pointings, which is valid input, not an error.
    pub fn elapsed_hours(&self, trigger_time: Epoch) -> Hour {
        (self.time - trigger_time).to_unit(Unit::Hour)
    }
}

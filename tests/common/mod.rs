use hifitime::{Epoch, Unit};

use skycover::constants::{FootprintLookup, InstrumentId, PointingId};
use skycover::coverage::pointing::Pointing;

/// Uniform probability map payload: every pixel carries `1 / npix`, so the total sky
/// probability is 1 and covered probability equals the covered sky fraction.
pub fn uniform_skymap_bytes(nside: u32) -> Vec<u8> {
    let npix = 12 * nside as usize * nside as usize;
    let density = 1.0 / npix as f64;
    let mut bytes = Vec::with_capacity(npix * 8);
    for _ in 0..npix {
        bytes.extend_from_slice(&density.to_le_bytes());
    }
    bytes
}

/// Axis-aligned square footprint text of the given side length, centered on the origin.
pub fn square_polygon(side_deg: f64) -> String {
    let h = side_deg / 2.0;
    let n = -h;
    format!("POLYGON(({n} {n},{h} {n},{h} {h},{n} {h},{n} {n}))")
}

/// Lookup with a single square-footprint instrument.
pub fn square_lookup(instrument: InstrumentId, side_deg: f64) -> FootprintLookup {
    let mut lookup = FootprintLookup::default();
    lookup.insert(instrument, vec![square_polygon(side_deg)]);
    lookup
}

pub fn trigger_time() -> Epoch {
    Epoch::from_gregorian_utc(2024, 5, 17, 12, 0, 0, 0)
}

/// Pointing `hours` after the trigger.
pub fn pointing_at(
    id: PointingId,
    ra: f64,
    dec: f64,
    hours: f64,
    instrument: InstrumentId,
) -> Pointing {
    let time = trigger_time() + Unit::Hour * hours;
    Pointing::new(id, ra, dec, None, time, instrument)
}

//! Fingerprinting of coverage requests.
//!
//! A computed series is only reusable for a request whose every coverage-affecting input
//! matches: the event, the skymap, the exact pointing set, the upstream selection, the
//! approximation flags, and the area-grid resolution. The fingerprint is a canonical string
//! over all of them. Pointing identifiers are sorted and deduplicated before rendering: the
//! set of pointings actually used, not their arrival order from the database, identifies the
//! computation.

use std::fmt;

use itertools::Itertools;

use crate::constants::{ApproximationMap, InstrumentId, PointingId};
use crate::coverage::pointing::Pointing;
use crate::selection::PointingFilters;

/// Identity of one coverage computation.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageKey {
    event_id: String,
    skymap_ref: String,
    pointing_ids: Vec<PointingId>,
    filters: PointingFilters,
    approximated: Vec<InstrumentId>,
    coarse_nside: u32,
}

impl CoverageKey {
    /// Assemble a key from the request's coverage-affecting inputs.
    ///
    /// Arguments
    /// ---------
    /// * `event_id`: identifier of the triggering event.
    /// * `skymap_ref`: stable reference to the skymap payload (e.g. its storage path).
    /// * `pointings`: the pointing set actually fed to the engine.
    /// * `filters`: upstream selection criteria.
    /// * `approximations`: instruments substituted with stand-in shapes.
    /// * `coarse_nside`: resolution of the deduplicated area grid.
    pub fn new(
        event_id: &str,
        skymap_ref: &str,
        pointings: &[Pointing],
        filters: &PointingFilters,
        approximations: &ApproximationMap,
        coarse_nside: u32,
    ) -> Self {
        let mut pointing_ids: Vec<PointingId> = pointings.iter().map(|p| p.id).collect();
        pointing_ids.sort_unstable();
        pointing_ids.dedup();

        let mut approximated: Vec<InstrumentId> = approximations.keys().copied().collect();
        approximated.sort_unstable();

        CoverageKey {
            event_id: event_id.to_string(),
            skymap_ref: skymap_ref.to_string(),
            pointing_ids,
            filters: filters.clone(),
            approximated,
            coarse_nside,
        }
    }

    /// Canonical fingerprint addressing the cache.
    ///
    /// Deterministic across processes: equal inputs render equal strings, and every field is
    /// delimited so distinct inputs cannot collide.
    pub fn fingerprint(&self) -> String {
        format!(
            "coverage/v1/{}/{}/n{}/p[{}]/{}/a[{}]",
            self.event_id,
            self.skymap_ref,
            self.coarse_nside,
            self.pointing_ids.iter().join(","),
            self.filters.fingerprint_component(),
            self.approximated.iter().join(","),
        )
    }
}

impl fmt::Display for CoverageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fingerprint())
    }
}

#[cfg(test)]
mod key_test {
    use super::*;
    use crate::constants::ApproximationMap;
    use hifitime::Epoch;

    fn pointing(id: u64) -> Pointing {
        Pointing::new(
            id,
            180.0,
            0.0,
            None,
            Epoch::from_gregorian_utc(2024, 5, 17, 12, 0, 0, 0),
            1,
        )
    }

    #[test]
    fn test_fingerprint_ignores_pointing_order() {
        let forward = [pointing(1), pointing(2), pointing(3)];
        let reversed = [pointing(3), pointing(2), pointing(1)];
        let filters = PointingFilters::default();
        let approximations = ApproximationMap::default();

        let a = CoverageKey::new("S240517a", "maps/0.fits", &forward, &filters, &approximations, 512);
        let b = CoverageKey::new("S240517a", "maps/0.fits", &reversed, &filters, &approximations, 512);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_distinguishes_inputs() {
        let pointings = [pointing(1), pointing(2)];
        let filters = PointingFilters::default();
        let approximations = ApproximationMap::default();
        let base = CoverageKey::new("S240517a", "maps/0.fits", &pointings, &filters, &approximations, 512);

        let other_event =
            CoverageKey::new("S240517b", "maps/0.fits", &pointings, &filters, &approximations, 512);
        assert_ne!(base.fingerprint(), other_event.fingerprint());

        let other_map =
            CoverageKey::new("S240517a", "maps/1.fits", &pointings, &filters, &approximations, 512);
        assert_ne!(base.fingerprint(), other_map.fingerprint());

        let other_nside =
            CoverageKey::new("S240517a", "maps/0.fits", &pointings, &filters, &approximations, 256);
        assert_ne!(base.fingerprint(), other_nside.fingerprint());

        let fewer = [pointing(1)];
        let other_pointings =
            CoverageKey::new("S240517a", "maps/0.fits", &fewer, &filters, &approximations, 512);
        assert_ne!(base.fingerprint(), other_pointings.fingerprint());
    }

    #[test]
    fn test_fingerprint_shape() {
        let key = CoverageKey::new(
            "S240517a",
            "maps/0.fits",
            &[pointing(2), pointing(1)],
            &PointingFilters::default(),
            &ApproximationMap::default(),
            512,
        );
        assert_eq!(
            key.fingerprint(),
            "coverage/v1/S240517a/maps/0.fits/n512/p[1,2]/i[]b[]d[]/a[]"
        );
    }
}

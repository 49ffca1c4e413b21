//! # Upstream pointing selection criteria
//!
//! The persistence layer selects which pointings feed the coverage engine: by instrument, by
//! bandpass, by limiting depth. The engine itself never filters, but every criterion changes
//! the computed series and therefore has to enter the cache fingerprint. This module gives
//! those criteria closed, typed representations.
//!
//! Bandpasses and depth units are closed enumerations with `FromStr` implementations; an
//! unknown name is an error at the boundary, never a silent string comparison at each call
//! site. Wavelengths come from an explicit conversion table.

use std::str::FromStr;

use itertools::Itertools;
use thiserror::Error;

use crate::constants::InstrumentId;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("unknown bandpass name: {0:?}")]
pub struct UnknownBandpass(pub String);

#[derive(Error, Debug, Clone, PartialEq)]
#[error("unknown depth unit name: {0:?}")]
pub struct UnknownDepthUnit(pub String);

/// Photometric bandpasses reported by follow-up instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bandpass {
    U,
    B,
    V,
    R,
    I,
    J,
    H,
    K,
    G,
    Z,
    Y,
    Tess,
    Clear,
    Other,
}

impl Bandpass {
    /// Stable lowercase token used for display and fingerprinting.
    pub fn as_str(&self) -> &'static str {
        match self {
            Bandpass::U => "u",
            Bandpass::B => "b",
            Bandpass::V => "v",
            Bandpass::R => "r",
            Bandpass::I => "i",
            Bandpass::J => "j",
            Bandpass::H => "h",
            Bandpass::K => "k",
            Bandpass::G => "g",
            Bandpass::Z => "z",
            Bandpass::Y => "y",
            Bandpass::Tess => "tess",
            Bandpass::Clear => "clear",
            Bandpass::Other => "other",
        }
    }

    /// Effective wavelength of the band in nanometers.
    ///
    /// `Clear` and `Other` carry no single wavelength and return `None`.
    pub fn effective_wavelength_nm(&self) -> Option<f64> {
        match self {
            Bandpass::U => Some(365.0),
            Bandpass::B => Some(445.0),
            Bandpass::V => Some(551.0),
            Bandpass::R => Some(658.0),
            Bandpass::I => Some(806.0),
            Bandpass::J => Some(1220.0),
            Bandpass::H => Some(1630.0),
            Bandpass::K => Some(2190.0),
            Bandpass::G => Some(477.0),
            Bandpass::Z => Some(913.0),
            Bandpass::Y => Some(1020.0),
            Bandpass::Tess => Some(786.5),
            Bandpass::Clear | Bandpass::Other => None,
        }
    }
}

impl std::fmt::Display for Bandpass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Bandpass {
    type Err = UnknownBandpass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "u" => Ok(Bandpass::U),
            "b" => Ok(Bandpass::B),
            "v" => Ok(Bandpass::V),
            "r" => Ok(Bandpass::R),
            "i" => Ok(Bandpass::I),
            "j" => Ok(Bandpass::J),
            "h" => Ok(Bandpass::H),
            "k" => Ok(Bandpass::K),
            "g" => Ok(Bandpass::G),
            "z" => Ok(Bandpass::Z),
            "y" => Ok(Bandpass::Y),
            "tess" => Ok(Bandpass::Tess),
            "clear" => Ok(Bandpass::Clear),
            "other" => Ok(Bandpass::Other),
            _ => Err(UnknownBandpass(s.to_string())),
        }
    }
}

/// Unit of a reported limiting depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DepthUnit {
    AbMag,
    VegaMag,
    /// Flux in erg s⁻¹ cm⁻²
    FluxErg,
}

impl DepthUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepthUnit::AbMag => "ab_mag",
            DepthUnit::VegaMag => "vega_mag",
            DepthUnit::FluxErg => "flux_erg",
        }
    }
}

impl std::fmt::Display for DepthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DepthUnit {
    type Err = UnknownDepthUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ab_mag" => Ok(DepthUnit::AbMag),
            "vega_mag" => Ok(DepthUnit::VegaMag),
            "flux_erg" => Ok(DepthUnit::FluxErg),
            _ => Err(UnknownDepthUnit(s.to_string())),
        }
    }
}

/// The upstream selection applied before handing pointings to the engine.
///
/// Only recorded here so the cache fingerprint captures it; the engine itself treats the
/// pointing list it receives as authoritative.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointingFilters {
    pub instruments: Vec<InstrumentId>,
    pub bands: Vec<Bandpass>,
    pub depth_limit: Option<f64>,
    pub depth_unit: Option<DepthUnit>,
}

impl PointingFilters {
    /// Canonical, order-insensitive rendering for fingerprinting.
    pub fn fingerprint_component(&self) -> String {
        let instruments = self.instruments.iter().sorted_unstable().join(",");
        let bands = self
            .bands
            .iter()
            .sorted_unstable()
            .map(Bandpass::as_str)
            .join(",");
        let depth = match (self.depth_limit, self.depth_unit) {
            (Some(limit), Some(unit)) => format!("{limit}:{unit}"),
            (Some(limit), None) => format!("{limit}"),
            (None, _) => String::new(),
        };
        format!("i[{instruments}]b[{bands}]d[{depth}]")
    }
}

#[cfg(test)]
mod selection_test {
    use super::*;

    #[test]
    fn test_bandpass_round_trip() {
        for band in [
            Bandpass::U,
            Bandpass::V,
            Bandpass::Tess,
            Bandpass::Clear,
            Bandpass::Other,
        ] {
            assert_eq!(band.as_str().parse::<Bandpass>(), Ok(band));
        }
        assert_eq!("TESS".parse::<Bandpass>(), Ok(Bandpass::Tess));
    }

    #[test]
    fn test_unknown_bandpass_is_an_error() {
        assert_eq!(
            "sloan-w".parse::<Bandpass>(),
            Err(UnknownBandpass("sloan-w".to_string()))
        );
    }

    #[test]
    fn test_wavelength_table() {
        assert_eq!(Bandpass::V.effective_wavelength_nm(), Some(551.0));
        assert_eq!(Bandpass::Clear.effective_wavelength_nm(), None);
    }

    #[test]
    fn test_depth_unit_round_trip() {
        for unit in [DepthUnit::AbMag, DepthUnit::VegaMag, DepthUnit::FluxErg] {
            assert_eq!(unit.as_str().parse::<DepthUnit>(), Ok(unit));
        }
        assert!("parsec".parse::<DepthUnit>().is_err());
    }

    #[test]
    fn test_fingerprint_component_is_order_insensitive() {
        let a = PointingFilters {
            instruments: vec![3, 1, 2],
            bands: vec![Bandpass::V, Bandpass::B],
            depth_limit: Some(20.5),
            depth_unit: Some(DepthUnit::AbMag),
        };
        let b = PointingFilters {
            instruments: vec![1, 2, 3],
            bands: vec![Bandpass::B, Bandpass::V],
            ..a.clone()
        };
        assert_eq!(a.fingerprint_component(), b.fingerprint_component());
        assert_eq!(
            a.fingerprint_component(),
            "i[1,2,3]b[b,v]d[20.5:ab_mag]"
        );
    }

    #[test]
    fn test_empty_filters_fingerprint() {
        assert_eq!(
            PointingFilters::default().fingerprint_component(),
            "i[]b[]d[]"
        );
    }
}

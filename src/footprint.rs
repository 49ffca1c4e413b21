//! # Instrument footprint geometry
//!
//! This module parses the footprint geometry text stored by the persistence layer into
//! local-frame polygon rings, ready for projection onto the sky.
//!
//! ## Stored format
//!
//! Each detector polygon is stored as a single line of well-known text:
//!
//! ```text
//! POLYGON((x1 y1, x2 y2, ..., x1 y1))
//! ```
//!
//! Vertex pairs are comma-separated, coordinates inside a pair are space-separated, and the
//! ring is explicitly closed by repeating the first vertex. Coordinates are degrees in a local
//! tangent-plane frame centered on the instrument's optical axis.
//!
//! An instrument may own multiple disjoint polygons (multi-CCD mosaics); each is projected and
//! pixel-indexed independently and their contributions are unioned by the coverage engine.
//!
//! ## Errors
//!
//! Parsing failures are recoverable at the batch level: the coverage engine skips the affected
//! pointing with a warning instead of aborting the sequence. See
//! [`crate::coverage::CoverageReport`].

use ahash::AHashSet;
use nom::{
    bytes::complete::tag,
    character::complete::{char, multispace0, multispace1},
    combinator::all_consuming,
    multi::separated_list1,
    number::complete::double,
    sequence::{delimited, separated_pair},
    IResult, Parser,
};
use smallvec::SmallVec;
use thiserror::Error;

use crate::constants::{Degree, InstrumentId};

/// A single `(x, y)` vertex in degrees.
pub type Vertex = (Degree, Degree);

/// Why a piece of footprint geometry text was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedGeometryError {
    #[error("geometry text does not match the POLYGON grammar: {0:?}")]
    GrammarMismatch(String),

    #[error("polygon ring is not closed (first and last vertices differ)")]
    OpenRing,

    #[error("polygon has fewer than 3 distinct vertices")]
    TooFewVertices,

    #[error("polygon contains a non-finite coordinate")]
    NonFiniteCoordinate,
}

/// An ordered, closed ring of local-frame vertices.
///
/// The closing vertex (a repeat of the first) is kept, so projection stays length-preserving
/// and re-serialization round-trips. Consumers that need the open ring strip it themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<Vertex>,
}

impl Polygon {
    /// Full closed ring, in storage order.
    pub fn ring(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Number of vertices including the closing repeat.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// A small, inline-optimized container for the polygons of a single instrument.
pub type Polygons = SmallVec<[Polygon; 2]>;

/// The full on-sky shape of an instrument's detector(s), in the local tangent frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    pub instrument: InstrumentId,
    pub polygons: Polygons,
}

impl Footprint {
    pub fn new(instrument: InstrumentId, polygons: Polygons) -> Self {
        Footprint {
            instrument,
            polygons,
        }
    }
}

fn vertex(input: &str) -> IResult<&str, Vertex> {
    separated_pair(double, multispace1, double).parse(input)
}

fn ring(input: &str) -> IResult<&str, Vec<Vertex>> {
    separated_list1((multispace0, char(','), multispace0), vertex).parse(input)
}

fn polygon_text(input: &str) -> IResult<&str, Vec<Vertex>> {
    all_consuming(delimited(
        (multispace0, tag("POLYGON"), multispace0, tag("(("), multispace0),
        ring,
        (multispace0, tag("))"), multispace0),
    ))
    .parse(input)
}

/// Parse one stored `POLYGON((...))` text into a closed local-frame ring.
///
/// Arguments
/// ---------
/// * `raw`: the geometry text as stored, e.g. `"POLYGON((-0.5 -0.5,0.5 -0.5,0.5 0.5,-0.5 -0.5))"`.
///
/// Return
/// ------
/// * The parsed [`Polygon`], or a [`MalformedGeometryError`] if the grammar does not match,
///   the ring is not closed, fewer than 3 distinct vertices remain before closure, or any
///   coordinate is non-finite.
pub fn parse_polygon(raw: &str) -> Result<Polygon, MalformedGeometryError> {
    let (_, vertices) = polygon_text(raw)
        .map_err(|_| MalformedGeometryError::GrammarMismatch(raw.trim().to_string()))?;

    if vertices.first() != vertices.last() {
        return Err(MalformedGeometryError::OpenRing);
    }

    if vertices
        .iter()
        .any(|&(x, y)| !x.is_finite() || !y.is_finite())
    {
        return Err(MalformedGeometryError::NonFiniteCoordinate);
    }

    // Distinct vertices before closure, compared bit-exactly.
    let distinct: AHashSet<(u64, u64)> = vertices[..vertices.len() - 1]
        .iter()
        .map(|&(x, y)| (x.to_bits(), y.to_bits()))
        .collect();
    if distinct.len() < 3 {
        return Err(MalformedGeometryError::TooFewVertices);
    }

    Ok(Polygon { vertices })
}

/// Parse every stored polygon of an instrument into a [`Footprint`].
///
/// The first malformed polygon rejects the whole footprint: a partially parsed mosaic would
/// silently under-report coverage.
pub fn parse_footprint(
    instrument: InstrumentId,
    raw_polygons: &[String],
) -> Result<Footprint, MalformedGeometryError> {
    if raw_polygons.is_empty() {
        return Err(MalformedGeometryError::GrammarMismatch(String::new()));
    }
    let polygons = raw_polygons
        .iter()
        .map(|raw| parse_polygon(raw))
        .collect::<Result<Polygons, _>>()?;
    Ok(Footprint::new(instrument, polygons))
}

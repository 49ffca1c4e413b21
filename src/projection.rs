//! # Spherical projection of instrument footprints
//!
//! This module rotates a footprint polygon, defined in the local tangent-plane frame of an
//! instrument's optical axis, onto celestial coordinates for a given pointing center and
//! position angle.
//!
//! ## Algorithm
//!
//! Each local `(x, y)` vertex is treated as a trial `(ra, dec)` pair and converted to a unit
//! vector with the standard spherical-to-Cartesian map. Three rotations are then chained:
//!
//! 1. **roll** about the projection axis (the local origin's direction) by the position angle,
//! 2. **pitch** about the y axis up to the center declination,
//! 3. **yaw** about the z axis to the center right ascension,
//!
//! after which the rotated vector is converted back to `(ra, dec)` with the right ascension
//! normalized into `[0, 360)`.
//!
//! Projecting the local origin `(0, 0)` returns the pointing center exactly (within floating
//! tolerance). Near the celestial poles the right ascension of a vertex becomes numerically
//! degenerate; the conversion returns a conventional RA of 0 there instead of propagating NaN.
//! No error path exists in this module: vertex-count validation belongs to the footprint
//! parser.
//!
//! ## See also
//! ------------
//! * [`crate::footprint`] – produces the local-frame rings consumed here.
//! * [`crate::skymap`] – converts the projected rings into HEALPix pixel sets.

use nalgebra::{Rotation3, Vector3};

use crate::constants::{Degree, Radian, DPI, RADEG};
use crate::footprint::{Polygon, Vertex};

/// Convert spherical coordinates to a unit vector.
///
/// Arguments
/// ---------
/// * `ra`: right ascension in radians.
/// * `dec`: declination in radians.
///
/// Return
/// ------
/// * The unit vector `(cos δ cos α, cos δ sin α, sin δ)`.
pub(crate) fn radec_to_unit_vector(ra: Radian, dec: Radian) -> Vector3<f64> {
    Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin())
}

/// Convert a Cartesian direction back to right ascension and declination.
///
/// Arguments
/// ---------
/// * `v`: direction vector, not necessarily normalized.
///
/// Return
/// ------
/// * Tuple `(α, δ)` in radians, with `α` in `[0, 2π)` and `δ` in `[−π/2, +π/2]`.
///
/// Remarks
/// -------
/// * A zero vector maps to `(0, 0)`.
/// * On the poles (`cos δ = 0`) the right ascension is degenerate and a conventional
///   `α = 0` is returned.
/// * The `z/‖v‖` ratio is clamped before `asin` so rounding can never produce NaN.
pub(crate) fn unit_vector_to_radec(v: &Vector3<f64>) -> (Radian, Radian) {
    let norm = v.norm();
    if norm == 0. {
        return (0.0, 0.0);
    }

    let delta = (v.z / norm).clamp(-1.0, 1.0).asin();
    if delta.cos() == 0.0 {
        return (0.0, delta);
    }

    let mut alpha = v.y.atan2(v.x);
    if alpha < 0.0 {
        alpha += DPI;
    }
    // The range is half-open: a tiny negative angle can round up to exactly 2π.
    if alpha >= DPI {
        alpha = 0.0;
    }
    (alpha, delta)
}

/// Build the local-frame → sky rotation for a pointing center and position angle.
fn pointing_rotation(
    center_ra: Degree,
    center_dec: Degree,
    position_angle: Degree,
) -> Rotation3<f64> {
    let roll = Rotation3::from_axis_angle(&Vector3::x_axis(), position_angle * RADEG);
    let pitch = Rotation3::from_axis_angle(&Vector3::y_axis(), -center_dec * RADEG);
    let yaw = Rotation3::from_axis_angle(&Vector3::z_axis(), center_ra * RADEG);
    yaw * pitch * roll
}

/// Project a list of local-frame vertices onto the sky.
///
/// Order- and length-preserving: the i-th output vertex is the projection of the i-th input
/// vertex, so a closed input ring stays closed.
///
/// Arguments
/// ---------
/// * `vertices`: local-frame `(x, y)` offsets in degrees.
/// * `center_ra`: right ascension of the pointing center in degrees.
/// * `center_dec`: declination of the pointing center in degrees.
/// * `position_angle`: rotation of the detector plane relative to sky north, in degrees.
///
/// Return
/// ------
/// * Sky-frame `(ra, dec)` vertices in degrees, RA normalized into `[0, 360)`.
pub fn project_vertices(
    vertices: &[Vertex],
    center_ra: Degree,
    center_dec: Degree,
    position_angle: Degree,
) -> Vec<Vertex> {
    let rotation = pointing_rotation(center_ra, center_dec, position_angle);

    vertices
        .iter()
        .map(|&(x, y)| {
            let local = radec_to_unit_vector(x * RADEG, y * RADEG);
            let sky = rotation * local;
            let (ra, dec) = unit_vector_to_radec(&sky);
            (ra / RADEG, dec / RADEG)
        })
        .collect()
}

/// Project a footprint polygon onto the sky for visualization or pixel indexing.
///
/// Standalone entry point used both by the coverage engine and by callers that only need the
/// projected outline (e.g. overlay rendering).
pub fn project_footprint(
    polygon: &Polygon,
    center_ra: Degree,
    center_dec: Degree,
    position_angle: Degree,
) -> Polygon {
    Polygon {
        vertices: project_vertices(polygon.ring(), center_ra, center_dec, position_angle),
    }
}

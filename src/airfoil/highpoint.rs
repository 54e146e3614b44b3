//! Moves the high point of a thickness or camber distribution along the chord and rescales its
//! magnitude.

use crate::airfoil::decompose::{Distribution, DistributionKind};
use crate::errors::{GeometryError, Result};
use crate::geometry::spline1::{Boundary, KnotSpacing, Spline1};
use tracing::debug;

/// High point positions closer than this are considered equal
const SAME_POSITION: f64 = 1e-6;

/// Samples used to verify that the station map is monotonic
const MONOTONIC_SAMPLES: usize = 200;

/// Returns a distribution whose high point lies at `x1`. The stations are mapped with a natural
/// cubic spline through (0, 0), (x0, x1) and (1, 1), and the values are then interpolated back
/// onto the original stations. The values at both ends are kept exactly.
pub fn remap_high_point(distribution: &Distribution, x1: f64) -> Result<Distribution> {
    if !(x1 > 0.0 && x1 < 1.0) {
        return Err(GeometryError::HighPointOutOfRange(x1));
    }

    let (x0, _) = distribution.high_point();
    if (x1 - x0).abs() < SAME_POSITION || distribution.is_flat() {
        return Ok(distribution.clone());
    }

    let map = Spline1::new(&[0.0, x0, 1.0], &[0.0, x1, 1.0], Boundary::Natural)?;
    let monotonic = (0..=MONOTONIC_SAMPLES)
        .map(|i| map.derivative(i as f64 / MONOTONIC_SAMPLES as f64, 1))
        .all(|d| d > 0.0);
    if !monotonic {
        return Err(GeometryError::NonMonotonicMap { from: x0, to: x1 });
    }

    let mapped: Vec<f64> = distribution.x().iter().map(|x| map.eval(*x)).collect();
    let moved = Spline1::build(&mapped, distribution.y(), Boundary::NotAKnot, KnotSpacing::Arccos)?;

    let last = distribution.y().len() - 1;
    let y: Vec<f64> = distribution
        .x()
        .iter()
        .enumerate()
        .map(|(i, x)| {
            if i == 0 || i == last {
                distribution.y()[i]
            } else {
                moved.eval(*x)
            }
        })
        .collect();

    debug!(x0, x1, kind = ?distribution.kind(), "high point moved");
    distribution.with_values(y)
}

/// Returns a distribution scaled so that its high point value becomes `value`. A thickness must
/// stay positive. A camber of zero flattens the camber line.
pub fn with_max(distribution: &Distribution, value: f64) -> Result<Distribution> {
    let name = match distribution.kind() {
        DistributionKind::Thickness => "max_thickness",
        DistributionKind::Camber => "max_camber",
    };

    if !value.is_finite() {
        return Err(GeometryError::InvalidParameter { name, value });
    }

    match distribution.kind() {
        DistributionKind::Thickness if value <= 0.0 => Err(GeometryError::InvalidParameter { name, value }),
        DistributionKind::Camber if value == 0.0 => Ok(distribution.scaled(0.0)),
        _ => {
            let (_, current) = distribution.high_point();
            if current.abs() < f64::EPSILON {
                return Err(GeometryError::InvalidParameter { name, value });
            }
            Ok(distribution.scaled(value / current))
        }
    }
}

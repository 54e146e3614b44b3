//! Moves, rotates and scales an airfoil so that its leading edge lies at (0, 0) and its trailing
//! edge (the midpoint of the two trailing edge points) at (1, 0).

use crate::airfoil::common::GeometryParams;
use crate::airfoil::{Airfoil, Shape};
use crate::algorithms::closest_index;
use crate::errors::{GeometryError, Outcome, Result, Status, Warning};
use crate::geometry::curve2::Curve2;
use crate::geometry::distances2::{dist, mid_point, signed_angle};
use crate::geometry::spline2::{LeSearchParams, Spline2};
use ncollide2d::na::{Point2, Rotation2, Vector2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeParams {
    /// Largest distance allowed between the spline leading edge and the leading edge vertex,
    /// and between the trailing edge midpoint and the chord line
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        NormalizeParams {
            tolerance: 1e-8,
            max_iterations: 50,
        }
    }
}

struct LeState {
    index: usize,
    point: Point2<f64>,
    deviation: f64,
    status: Status,
}

fn locate_le(spline: &Spline2, params: &LeSearchParams) -> LeState {
    let le = spline.find_leading_edge(params);
    let point = spline.point_at(le.value);
    let index = closest_index(spline.u(), le.value);
    LeState {
        index,
        point,
        deviation: dist(&point, &spline.points()[index]),
        status: le.status,
    }
}

fn te_offset(points: &[Point2<f64>]) -> f64 {
    let te = mid_point(&points[0], &points[points.len() - 1]);
    (te.x - 1.0).abs().max(te.y.abs())
}

/// True if the leading edge vertex is at the origin, coincides with the leading edge of the
/// contour spline, and the trailing edge midpoint lies at (1, 0).
pub fn is_normalized(airfoil: &Airfoil, params: &GeometryParams) -> bool {
    let tol = params.normalize.tolerance;
    let points = airfoil.points();
    if te_offset(points) > tol {
        return false;
    }

    if let Shape::Bezier(_) = airfoil.shape() {
        let le = points[airfoil.le_index()];
        return le.x.abs() <= tol && le.y.abs() <= tol;
    }

    match airfoil.spline() {
        Ok(spline) => {
            let le = locate_le(&spline, &params.le_search);
            let vertex = points[le.index];
            le.deviation <= tol && vertex.x.abs() <= tol && vertex.y.abs() <= tol
        }
        Err(_) => false,
    }
}

/// Translates the leading edge vertex to the origin, rotates the trailing edge midpoint onto the
/// x-axis and scales each side so that its trailing edge point lies at x = 1.
fn place(points: &[Point2<f64>], i_le: usize) -> Result<Vec<Point2<f64>>> {
    let last = points.len() - 1;
    let le = points[i_le];
    let v = mid_point(&points[0], &points[last]) - le;
    let rotation = Rotation2::new(signed_angle(&v, &Vector2::x()));

    let mut moved: Vec<Point2<f64>> = points.iter().map(|p| Point2::from(rotation * (p - le))).collect();

    for end in [0, last] {
        if moved[end].x <= f64::EPSILON {
            return Err(GeometryError::InvalidParameter {
                name: "trailing edge x",
                value: moved[end].x,
            });
        }
    }

    let scale_first = 1.0 / moved[0].x;
    let scale_last = 1.0 / moved[last].x;
    for (i, p) in moved.iter_mut().enumerate() {
        let s = if i <= i_le { scale_first } else { scale_last };
        *p = Point2::new(p.x * s, p.y * s);
    }

    moved[i_le] = Point2::origin();
    moved[0].x = 1.0;
    moved[last].x = 1.0;
    Ok(moved)
}

/// Returns a normalized copy of the airfoil. An airfoil which is already normalized comes back
/// unchanged. If the leading edge does not settle within the iteration cap the last iterate is
/// returned together with a warning.
pub fn normalize(airfoil: &Airfoil, params: &GeometryParams) -> Result<Outcome<Airfoil>> {
    if is_normalized(airfoil, params) {
        return Ok(Outcome::success(airfoil.clone()));
    }

    let tol = params.normalize.tolerance;
    let max_iterations = params.normalize.max_iterations;
    let mut points = airfoil.points().to_vec();
    let mut status = Status::Success;
    let last = points.len() - 1;
    let mut iteration = 0;

    loop {
        let spline = Spline2::from_points(&points)?;
        let le = locate_le(&spline, &params.le_search);
        status = status.and(le.status);

        let offset = te_offset(&points);
        debug!(iteration, deviation = le.deviation, offset, "normalize");

        if iteration > 0 && le.deviation <= tol && offset <= tol {
            return Ok(Outcome::with_status(airfoil.with_points(points)?, status));
        }

        if iteration == max_iterations {
            warn!(iteration, deviation = le.deviation, "normalization did not converge");
            let warning = Warning::NormalizeNotConverged {
                iterations: iteration,
                deviation: le.deviation.max(offset),
            };
            let result = airfoil.with_points(points)?;
            return Ok(match status {
                Status::Success => Outcome::warning(result, warning),
                s => Outcome::with_status(result, s),
            });
        }

        // The knot closest to the spline leading edge becomes the leading edge vertex
        if le.index > 0 && le.index < last {
            points[le.index] = le.point;
        }
        points = place(&points, le.index)?;
        iteration += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airfoil::generate::{AirfoilGenerator, Naca4Digit};
    use approx::assert_relative_eq;
    use ncollide2d::na::{Isometry2, Vector2};
    use test_case::test_case;

    fn displaced(af: &Airfoil, angle: f64, scale: f64) -> Airfoil {
        let iso = Isometry2::new(Vector2::new(0.3, -0.2), angle);
        let pts = af.points().iter().map(|p| iso * Point2::from(p.coords * scale)).collect();
        Airfoil::new("displaced", pts).unwrap()
    }

    #[test]
    fn generated_airfoil_is_normalized() {
        let af = Naca4Digit::new(0.12, 1.0, 0.0, 0.0).airfoil(61).unwrap();
        assert!(is_normalized(&af, &GeometryParams::default()));

        let n = normalize(&af, &GeometryParams::default()).unwrap();
        assert!(n.status.is_success());
        assert_eq!(af, n.value);
    }

    #[test_case(0.1, 2.0)]
    #[test_case(-0.05, 0.5)]
    #[test_case(0.0, 1.3)]
    fn displaced_airfoil_is_restored(angle: f64, scale: f64) {
        let params = GeometryParams::default();
        let af = Naca4Digit::new(0.10, 1.0, 0.02, 0.4).airfoil(81).unwrap();
        let n = normalize(&displaced(&af, angle, scale), &params).unwrap();

        assert!(n.status.is_success());
        let le = n.value.points()[n.value.le_index()];
        assert_relative_eq!(0.0, le.x, epsilon = 1e-12);
        assert_relative_eq!(0.0, le.y, epsilon = 1e-12);

        let pts = n.value.points();
        let te = mid_point(&pts[0], &pts[pts.len() - 1]);
        assert_relative_eq!(1.0, te.x, epsilon = 1e-12);
        assert_relative_eq!(0.0, te.y, epsilon = 1e-8);
        assert!(is_normalized(&n.value, &params));
    }

    #[test]
    fn normalization_is_idempotent() {
        let params = GeometryParams::default();
        let af = Naca4Digit::new(0.12, 1.0, 0.04, 0.3).airfoil(71).unwrap();
        let once = normalize(&displaced(&af, 0.2, 1.5), &params).unwrap().value;
        let twice = normalize(&once, &params).unwrap().value;
        assert_eq!(once, twice);
    }

    #[test_case(12, 0.1, 1.5)]
    #[test_case(20, 0.1, 1.5)]
    #[test_case(20, 0.0, 1.0)]
    fn coarse_airfoil_converges(n: usize, angle: f64, scale: f64) {
        let params = GeometryParams::default();
        let af = Naca4Digit::from_designation("2412").unwrap().airfoil(n).unwrap();
        let once = normalize(&displaced(&af, angle, scale), &params).unwrap();
        assert!(once.status.is_success());
        assert!(is_normalized(&once.value, &params));

        let twice = normalize(&once.value, &params).unwrap();
        assert!(twice.status.is_success());
        assert_eq!(once.value, twice.value);
    }

    #[test]
    fn order_is_preserved() {
        let params = GeometryParams::default();
        let af = Naca4Digit::new(0.12, 1.0, 0.02, 0.4).airfoil(61).unwrap();
        let flipped = af.to_order(crate::airfoil::SurfaceOrder::UpperFirst);
        let n = normalize(&displaced(&flipped, 0.1, 1.0), &params).unwrap().value;
        assert_eq!(crate::airfoil::SurfaceOrder::UpperFirst, n.order());
    }

    #[test]
    fn iteration_cap_gives_warning() {
        let mut params = GeometryParams::default();
        params.normalize.max_iterations = 0;
        let af = Naca4Digit::new(0.12, 1.0, 0.02, 0.4).airfoil(61).unwrap();
        let n = normalize(&displaced(&af, 0.1, 1.0), &params).unwrap();
        assert!(matches!(
            n.status,
            Status::Warning(Warning::NormalizeNotConverged { iterations: 0, .. })
        ));
    }
}

use crate::algorithms::{bisection, golden_section_max};
use crate::errors::{GeometryError, Outcome, Result, Warning};
use crate::geometry::curve2::Curve2;
use crate::geometry::distances2::{dist, mid_point};
use crate::geometry::spline1::{Boundary, Spline1};
use itertools::Itertools;
use ncollide2d::na::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Parameters of the leading edge search on a contour spline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeSearchParams {
    /// Convergence tolerance on the curve parameter
    pub tolerance: f64,
    pub max_iterations: usize,

    /// Number of knots on either side of the minimum x vertex which bracket the search
    pub bracket_knots: usize,
}

impl Default for LeSearchParams {
    fn default() -> Self {
        LeSearchParams {
            tolerance: 1e-10,
            max_iterations: 200,
            bracket_knots: 2,
        }
    }
}

/// A planar cubic spline through an ordered sequence of points, parametrized by the normalized
/// cumulative chord length u in [0, 1].
#[derive(Debug, Clone)]
pub struct Spline2 {
    points: Vec<Point2<f64>>,
    u: Vec<f64>,
    sx: Spline1,
    sy: Spline1,
}

impl Spline2 {
    pub fn new(points: &[Point2<f64>], boundary: Boundary) -> Result<Self> {
        if points.len() < 4 {
            return Err(GeometryError::NotEnoughPoints {
                needed: 4,
                found: points.len(),
            });
        }

        if let Some(index) = points.iter().position(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(GeometryError::InvalidCoordinate { index });
        }

        let mut u = Vec::with_capacity(points.len());
        u.push(0.0);
        for (index, (a, b)) in points.iter().tuple_windows().enumerate() {
            let d = dist(a, b);
            if d <= f64::EPSILON {
                return Err(GeometryError::DegeneratePoints { index });
            }
            u.push(u[index] + d);
        }

        let total = u[u.len() - 1];
        u.iter_mut().for_each(|v| *v /= total);

        let x: Vec<f64> = points.iter().map(|p| p.x).collect();
        let y: Vec<f64> = points.iter().map(|p| p.y).collect();

        Ok(Spline2 {
            points: points.to_vec(),
            sx: Spline1::new(&u, &x, boundary)?,
            sy: Spline1::new(&u, &y, boundary)?,
            u,
        })
    }

    pub fn from_points(points: &[Point2<f64>]) -> Result<Self> {
        Self::new(points, Boundary::NotAKnot)
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    /// Curve parameter of every knot
    pub fn u(&self) -> &[f64] {
        &self.u
    }

    /// The midpoint between the first and last point of the contour
    pub fn te_mid(&self) -> Point2<f64> {
        mid_point(&self.points[0], &self.points[self.points.len() - 1])
    }

    /// Finds the curve parameter of the leading edge, the point of the contour farthest from the
    /// midpoint of its two ends. Where the tangent there is perpendicular to the direction to the
    /// trailing edge midpoint, the result is refined by bisection on their dot product.
    pub fn find_leading_edge(&self, params: &LeSearchParams) -> Outcome<f64> {
        let i_min = self
            .points
            .iter()
            .position_min_by(|a, b| a.x.total_cmp(&b.x))
            .unwrap_or(0);

        let last = self.points.len() - 1;
        if i_min == 0 || i_min == last {
            warn!(i_min, "minimum x lies on the trailing edge, no leading edge bracket");
            return Outcome::warning(self.u[i_min], Warning::LeadingEdgeNotFound);
        }

        let te = self.te_mid();
        let lo = self.u[i_min.saturating_sub(params.bracket_knots)];
        let hi = self.u[(i_min + params.bracket_knots).min(last)];

        let dist_sq = |u: f64| (self.point_at(u) - te).norm_squared();
        let u_far = golden_section_max(dist_sq, lo, hi, params.tolerance, params.max_iterations);

        let dot = |u: f64| (self.point_at(u) - te).dot(&self.derivative_at(u, 1));
        if let Some(u_le) = bisection(dot, lo, hi, params.tolerance, params.max_iterations) {
            debug!(u_le, u_far, "leading edge found");
            return Outcome::success(u_le);
        }

        let span = hi - lo;
        if (u_far - lo) < 1e-6 * span || (hi - u_far) < 1e-6 * span {
            warn!(lo, hi, "leading edge maximum lies on the bracket boundary");
            return Outcome::warning(self.u[i_min], Warning::LeadingEdgeNotFound);
        }

        Outcome::success(u_far)
    }
}

impl Curve2 for Spline2 {
    fn point_at(&self, u: f64) -> Point2<f64> {
        Point2::new(self.sx.eval(u), self.sy.eval(u))
    }

    fn derivative_at(&self, u: f64, order: usize) -> Vector2<f64> {
        Vector2::new(self.sx.derivative(u, order), self.sy.derivative(u, order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;
    use test_case::test_case;

    /// An ellipse from (1, 0) around through (-1, 0) and back to (1, 0), clockwise start
    fn ellipse(n: usize, b: f64) -> Vec<Point2<f64>> {
        (0..n)
            .map(|i| {
                let t = 2.0 * PI * i as f64 / (n - 1) as f64;
                Point2::new(t.cos(), -b * t.sin())
            })
            .collect()
    }

    #[test]
    fn interpolates_knots() {
        let pts = ellipse(41, 0.3);
        let s = Spline2::from_points(&pts).unwrap();
        for (p, u) in pts.iter().zip(s.u()) {
            assert_relative_eq!(p.x, s.point_at(*u).x, epsilon = 1e-12);
            assert_relative_eq!(p.y, s.point_at(*u).y, epsilon = 1e-12);
        }
        assert_relative_eq!(0.0, s.u()[0]);
        assert_relative_eq!(1.0, s.u()[40]);
    }

    #[test]
    fn curvature_of_circle() {
        let pts = ellipse(81, 1.0);
        let s = Spline2::from_points(&pts).unwrap();
        // Clockwise traversal, so the curvature is negative
        assert_relative_eq!(-1.0, s.curvature_at(0.3), epsilon = 2e-3);
    }

    #[test_case(41)]
    #[test_case(40)]
    fn leading_edge_of_ellipse(n: usize) {
        let pts = ellipse(n, 0.2);
        let s = Spline2::from_points(&pts).unwrap();
        let le = s.find_leading_edge(&LeSearchParams::default());

        assert!(le.status.is_success());
        let p = s.point_at(le.value);
        assert_relative_eq!(-1.0, p.x, epsilon = 1e-4);
        assert_relative_eq!(0.0, p.y, epsilon = 1e-3);
    }

    #[test]
    fn rejects_short_input() {
        let pts = vec![Point2::new(1.0, 0.0), Point2::new(0.0, 0.0)];
        assert_eq!(
            Err(GeometryError::NotEnoughPoints {
                needed: 4,
                found: 2
            }),
            Spline2::from_points(&pts).map(|_| ())
        );
    }

    #[test]
    fn rejects_duplicates() {
        let pts = vec![
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 0.1),
            Point2::new(0.0, 0.1),
            Point2::new(1.0, 0.0),
        ];
        assert_eq!(
            Err(GeometryError::DegeneratePoints { index: 1 }),
            Spline2::from_points(&pts).map(|_| ())
        );
    }

    #[test]
    fn rejects_non_finite() {
        let mut pts = ellipse(10, 0.2);
        pts[3].y = f64::NAN;
        assert_eq!(
            Err(GeometryError::InvalidCoordinate { index: 3 }),
            Spline2::from_points(&pts).map(|_| ())
        );
    }
}

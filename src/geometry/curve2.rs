use crate::algorithms::invert_monotonic;
use crate::geometry::bezier::Bezier2;
use crate::geometry::spline2::Spline2;
use ncollide2d::na::{Point2, Vector2};

/// A parametric planar curve on u in [0, 1]. Evaluating at 0 and 1 yields the end points.
pub trait Curve2 {
    fn point_at(&self, u: f64) -> Point2<f64>;

    /// Derivative of the given order with respect to the curve parameter
    fn derivative_at(&self, u: f64, order: usize) -> Vector2<f64>;

    /// Signed curvature, positive where the curve turns counterclockwise
    fn curvature_at(&self, u: f64) -> f64 {
        let d1 = self.derivative_at(u, 1);
        let d2 = self.derivative_at(u, 2);
        let speed = d1.norm_squared();
        if speed <= f64::EPSILON * f64::EPSILON {
            return 0.0;
        }
        (d1.x * d2.y - d1.y * d2.x) / speed.powf(1.5)
    }

    /// The y value where the curve crosses `x`, for curves whose x grows monotonically with u.
    /// Values of x beyond the end points are clamped.
    fn y_at_x(&self, x: f64) -> f64 {
        let u = invert_monotonic(
            |u| self.point_at(u).x,
            |u| self.derivative_at(u, 1).x,
            x,
            0.0,
            1.0,
            1e-13,
            100,
        );
        self.point_at(u).y
    }

    fn sample(&self, u: &[f64]) -> Vec<Point2<f64>> {
        u.iter().map(|v| self.point_at(*v)).collect()
    }
}

/// One side of an airfoil as a curve running from the leading edge to the trailing edge
#[derive(Debug, Clone)]
pub enum SurfaceCurve {
    /// The part of a contour spline between two curve parameters. `u_start` may be larger than
    /// `u_end`, in which case the branch runs against the spline.
    Branch {
        spline: Spline2,
        u_start: f64,
        u_end: f64,
    },

    Bezier(Bezier2),
}

impl SurfaceCurve {
    pub fn branch(spline: &Spline2, u_start: f64, u_end: f64) -> Self {
        SurfaceCurve::Branch {
            spline: spline.clone(),
            u_start,
            u_end,
        }
    }

    /// Maps a curve parameter on this surface to the parameter of the underlying spline
    pub fn to_spline_u(&self, v: f64) -> f64 {
        match self {
            SurfaceCurve::Branch { u_start, u_end, .. } => u_start + v * (u_end - u_start),
            SurfaceCurve::Bezier(_) => v,
        }
    }
}

impl Curve2 for SurfaceCurve {
    fn point_at(&self, u: f64) -> Point2<f64> {
        match self {
            SurfaceCurve::Branch { spline, .. } => spline.point_at(self.to_spline_u(u)),
            SurfaceCurve::Bezier(b) => b.point_at(u),
        }
    }

    fn derivative_at(&self, u: f64, order: usize) -> Vector2<f64> {
        match self {
            SurfaceCurve::Branch {
                spline,
                u_start,
                u_end,
            } => spline.derivative_at(self.to_spline_u(u), order) * (u_end - u_start).powi(order as i32),
            SurfaceCurve::Bezier(b) => b.derivative_at(u, order),
        }
    }
}

use crate::errors::{GeometryError, Result};
use crate::geometry::curve2::Curve2;
use ncollide2d::na::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// A Bezier curve of arbitrary degree, defined by its control points. The curve passes through
/// the first and the last control point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BezierData")]
pub struct Bezier2 {
    #[serde(with = "crate::serialize::points")]
    points: Vec<Point2<f64>>,
}

/// Unchecked control points, validated by `Bezier2::new` when deserialized
#[derive(Deserialize)]
struct BezierData {
    #[serde(with = "crate::serialize::points")]
    points: Vec<Point2<f64>>,
}

impl TryFrom<BezierData> for Bezier2 {
    type Error = GeometryError;

    fn try_from(data: BezierData) -> Result<Self> {
        Bezier2::new(data.points)
    }
}

impl Bezier2 {
    pub fn new(points: Vec<Point2<f64>>) -> Result<Self> {
        if points.len() < 2 {
            return Err(GeometryError::NotEnoughPoints {
                needed: 2,
                found: points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(GeometryError::InvalidCoordinate { index });
        }

        Ok(Bezier2 { points })
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    pub fn degree(&self) -> usize {
        self.points.len() - 1
    }

    /// A copy of this curve with control point `i` moved to `p`
    pub fn with_point(&self, i: usize, p: Point2<f64>) -> Self {
        let mut points = self.points.clone();
        points[i] = p;
        Bezier2 { points }
    }

    /// A copy of this curve with every control point mirrored on the x-axis
    pub fn mirrored(&self) -> Self {
        Bezier2 {
            points: self.points.iter().map(|p| Point2::new(p.x, -p.y)).collect(),
        }
    }
}

/// Evaluates the polynomial with the given control vectors with de Casteljau's algorithm
fn de_casteljau(control: &[Vector2<f64>], u: f64) -> Vector2<f64> {
    let mut work = control.to_vec();
    for k in (1..work.len()).rev() {
        for i in 0..k {
            work[i] = work[i] * (1.0 - u) + work[i + 1] * u;
        }
    }
    work.first().copied().unwrap_or_else(Vector2::zeros)
}

impl Curve2 for Bezier2 {
    fn point_at(&self, u: f64) -> Point2<f64> {
        let control: Vec<Vector2<f64>> = self.points.iter().map(|p| p.coords).collect();
        Point2::from(de_casteljau(&control, u))
    }

    fn derivative_at(&self, u: f64, order: usize) -> Vector2<f64> {
        let mut control: Vec<Vector2<f64>> = self.points.iter().map(|p| p.coords).collect();
        for _ in 0..order {
            if control.len() < 2 {
                return Vector2::zeros();
            }
            let n = (control.len() - 1) as f64;
            control = control.windows(2).map(|w| (w[1] - w[0]) * n).collect();
        }
        de_casteljau(&control, u)
    }
}

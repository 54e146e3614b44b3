use crate::airfoil::common::GeometryParams;
use crate::airfoil::decompose::decompose;
use crate::airfoil::panel::bezier_distribution;
use crate::errors::{GeometryError, Outcome, Result};
use crate::geometry::bezier::Bezier2;
use crate::geometry::curve2::{Curve2, SurfaceCurve};
use crate::geometry::distances2::{dist, signed_area2};
use crate::geometry::spline2::{LeSearchParams, Spline2};
use itertools::Itertools;
use ncollide2d::na::Point2;
use serde::{Deserialize, Serialize};

pub mod bezier_match;
pub mod common;
pub mod decompose;
pub mod edit;
pub mod generate;
pub mod highpoint;
pub mod normalize;
pub mod panel;

/// The direction in which the contour of an airfoil is traversed. Either way the contour starts
/// and ends at the trailing edge and passes the leading edge in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SurfaceOrder {
    /// Trailing edge, lower surface, leading edge, upper surface, trailing edge (clockwise)
    #[default]
    LowerFirst,

    /// Trailing edge, upper surface, leading edge, lower surface, trailing edge (counterclockwise)
    UpperFirst,
}

impl SurfaceOrder {
    /// Detects the order from the signed area of a closed contour
    pub fn detect(points: &[Point2<f64>]) -> SurfaceOrder {
        if signed_area2(points) > 0.0 {
            SurfaceOrder::UpperFirst
        } else {
            SurfaceOrder::LowerFirst
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Upper,
    Lower,
}

impl Side {
    /// +1 for the upper side, -1 for the lower one
    pub fn sign(&self) -> f64 {
        match self {
            Side::Upper => 1.0,
            Side::Lower => -1.0,
        }
    }
}

/// The two Bezier curves of a Bezier-backed airfoil, both running from the leading edge to the
/// trailing edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BezierSides {
    pub upper: Bezier2,
    pub lower: Bezier2,
}

impl BezierSides {
    pub fn side(&self, side: Side) -> &Bezier2 {
        match side {
            Side::Upper => &self.upper,
            Side::Lower => &self.lower,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Coordinates,
    Bezier(BezierSides),
}

/// An airfoil as an ordered, closed contour of points. Airfoils are values: every edit returns a
/// new instance and leaves its input untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Airfoil {
    name: String,

    #[serde(with = "crate::serialize::points")]
    points: Vec<Point2<f64>>,

    order: SurfaceOrder,
    shape: Shape,
}

/// Derived geometric properties of a normalized airfoil
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    pub max_thickness: f64,
    pub max_thickness_x: f64,
    pub max_camber: f64,
    pub max_camber_x: f64,
    pub le_radius: f64,
    pub te_gap: f64,
}

fn validate(points: &[Point2<f64>]) -> Result<()> {
    if points.len() < 4 {
        return Err(GeometryError::NotEnoughPoints {
            needed: 4,
            found: points.len(),
        });
    }

    if let Some(index) = points.iter().position(|p| !(p.x.is_finite() && p.y.is_finite())) {
        return Err(GeometryError::InvalidCoordinate { index });
    }

    if let Some((index, _)) = points
        .iter()
        .tuple_windows()
        .find_position(|(a, b)| dist(*a, *b) <= f64::EPSILON)
    {
        return Err(GeometryError::DegeneratePoints { index });
    }

    Ok(())
}

impl Airfoil {
    /// Creates a coordinate-backed airfoil. The traversal order is detected from the contour.
    pub fn new(name: impl Into<String>, points: Vec<Point2<f64>>) -> Result<Self> {
        validate(&points)?;
        Ok(Airfoil {
            name: name.into(),
            order: SurfaceOrder::detect(&points),
            points,
            shape: Shape::Coordinates,
        })
    }

    /// Assembles an airfoil from its two surfaces, each given from the leading edge to the
    /// trailing edge. The leading edge point of the upper surface is shared by both.
    pub fn from_sides(
        name: impl Into<String>,
        upper: &[Point2<f64>],
        lower: &[Point2<f64>],
        order: SurfaceOrder,
    ) -> Result<Self> {
        if upper.len() < 2 || lower.len() < 2 {
            return Err(GeometryError::NotEnoughPoints {
                needed: 2,
                found: upper.len().min(lower.len()),
            });
        }

        let (first, second) = match order {
            SurfaceOrder::LowerFirst => (lower, upper),
            SurfaceOrder::UpperFirst => (upper, lower),
        };

        let mut points: Vec<Point2<f64>> = Vec::with_capacity(upper.len() + lower.len() - 1);
        points.extend(first.iter().skip(1).rev());
        points.push(upper[0]);
        points.extend(second.iter().skip(1));

        validate(&points)?;
        Ok(Airfoil {
            name: name.into(),
            points,
            order,
            shape: Shape::Coordinates,
        })
    }

    /// Creates a Bezier-backed airfoil whose points sample each curve at `points_per_side`
    /// parameters of the Bezier panel distribution.
    pub fn from_bezier(
        name: impl Into<String>,
        sides: BezierSides,
        points_per_side: usize,
        order: SurfaceOrder,
    ) -> Result<Self> {
        let u = bezier_distribution(points_per_side)?;
        let upper = sides.upper.sample(&u);
        let lower = sides.lower.sample(&u);

        let mut airfoil = Airfoil::from_sides(name, &upper, &lower, order)?;
        airfoil.shape = Shape::Bezier(sides);
        Ok(airfoil)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    pub fn order(&self) -> SurfaceOrder {
        self.order
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn bezier(&self) -> Option<&BezierSides> {
        match &self.shape {
            Shape::Bezier(sides) => Some(sides),
            Shape::Coordinates => None,
        }
    }

    /// A coordinate-backed airfoil with the same name and traversal order
    pub fn with_points(&self, points: Vec<Point2<f64>>) -> Result<Self> {
        validate(&points)?;
        Ok(Airfoil {
            name: self.name.clone(),
            points,
            order: self.order,
            shape: Shape::Coordinates,
        })
    }

    /// The same contour traversed in the given order
    pub fn to_order(&self, order: SurfaceOrder) -> Self {
        if order == self.order {
            return self.clone();
        }
        let mut result = self.clone();
        result.points.reverse();
        result.order = order;
        result
    }

    /// Index of the vertex with the smallest x, the leading edge of a normalized airfoil
    pub fn le_index(&self) -> usize {
        self.points
            .iter()
            .position_min_by(|a, b| a.x.total_cmp(&b.x))
            .unwrap_or(0)
    }

    fn split(&self) -> (Vec<Point2<f64>>, Vec<Point2<f64>>) {
        let i = self.le_index();
        let first: Vec<Point2<f64>> = self.points[..=i].iter().rev().copied().collect();
        let second: Vec<Point2<f64>> = self.points[i..].to_vec();
        match self.order {
            SurfaceOrder::LowerFirst => (second, first),
            SurfaceOrder::UpperFirst => (first, second),
        }
    }

    /// Points of the upper surface from the leading edge vertex to the trailing edge
    pub fn upper(&self) -> Vec<Point2<f64>> {
        self.split().0
    }

    /// Points of the lower surface from the leading edge vertex to the trailing edge
    pub fn lower(&self) -> Vec<Point2<f64>> {
        self.split().1
    }

    /// The distance between the two trailing edge points
    pub fn te_gap(&self) -> f64 {
        dist(&self.points[0], &self.points[self.points.len() - 1])
    }

    pub fn spline(&self) -> Result<Spline2> {
        Spline2::from_points(&self.points)
    }

    /// The upper and lower surface as curves from the leading edge to the trailing edge. For
    /// coordinate-backed airfoils the leading edge is located on the contour spline.
    pub fn surfaces(&self, params: &LeSearchParams) -> Result<Outcome<(SurfaceCurve, SurfaceCurve)>> {
        if let Shape::Bezier(sides) = &self.shape {
            return Ok(Outcome::success((
                SurfaceCurve::Bezier(sides.upper.clone()),
                SurfaceCurve::Bezier(sides.lower.clone()),
            )));
        }

        let spline = self.spline()?;
        let le = spline.find_leading_edge(params);
        let u_le = le.value;
        let first = SurfaceCurve::branch(&spline, u_le, 0.0);
        let second = SurfaceCurve::branch(&spline, u_le, 1.0);

        let pair = match self.order {
            SurfaceOrder::LowerFirst => (second, first),
            SurfaceOrder::UpperFirst => (first, second),
        };
        Ok(Outcome::with_status(pair, le.status))
    }

    /// Radius of curvature at the leading edge
    pub fn le_radius(&self, params: &LeSearchParams) -> Result<Outcome<f64>> {
        Ok(self.surfaces(params)?.map(|(upper, _)| 1.0 / upper.curvature_at(0.0).abs()))
    }

    pub fn properties(&self, params: &GeometryParams) -> Result<Outcome<Properties>> {
        let decomposed = decompose(self, params)?;
        Ok(decomposed.map(|d| {
            let (max_thickness_x, max_thickness) = d.thickness.high_point();
            let (max_camber_x, max_camber) = d.camber.high_point();
            Properties {
                max_thickness,
                max_thickness_x,
                max_camber,
                max_camber_x,
                le_radius: 1.0 / d.le_curvature.abs(),
                te_gap: d.thickness.te_value(),
            }
        }))
    }
}

//! Splits a normalized airfoil into thickness and camber distributions over common chord
//! stations, and reassembles an airfoil from them.

use crate::airfoil::common::GeometryParams;
use crate::airfoil::normalize::normalize;
use crate::airfoil::{Airfoil, SurfaceOrder};
use crate::algorithms::golden_section_max;
use crate::errors::{GeometryError, Outcome, Result};
use crate::geometry::curve2::Curve2;
use crate::geometry::spline1::{Boundary, KnotSpacing, Spline1};
use itertools::{izip, Itertools};
use ncollide2d::na::Point2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributionKind {
    Thickness,
    Camber,
}

/// A function of the chord fraction sampled at strictly increasing stations in [0, 1]. Only
/// `Distribution::new` builds one, so there are always at least two stations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DistributionData")]
pub struct Distribution {
    kind: DistributionKind,
    x: Vec<f64>,
    y: Vec<f64>,
}

#[derive(Deserialize)]
struct DistributionData {
    kind: DistributionKind,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl TryFrom<DistributionData> for Distribution {
    type Error = GeometryError;

    fn try_from(data: DistributionData) -> Result<Self> {
        Distribution::new(data.kind, data.x, data.y)
    }
}

impl Distribution {
    pub fn new(kind: DistributionKind, x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() {
            return Err(GeometryError::LengthMismatch(x.len(), y.len()));
        }
        if x.len() < 2 {
            return Err(GeometryError::NotEnoughPoints {
                needed: 2,
                found: x.len(),
            });
        }
        if let Some(index) = x.iter().chain(&y).position(|v| !v.is_finite()) {
            return Err(GeometryError::InvalidCoordinate { index: index % x.len() });
        }
        if let Some((index, _)) = x.iter().tuple_windows().find_position(|(a, b)| b <= a) {
            return Err(GeometryError::NotStrictlyIncreasing { index: index + 1 });
        }

        Ok(Distribution { kind, x, y })
    }

    pub fn kind(&self) -> DistributionKind {
        self.kind
    }

    /// The stations
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn le_value(&self) -> f64 {
        self.y[0]
    }

    pub fn te_value(&self) -> f64 {
        self.y[self.y.len() - 1]
    }

    /// True if every value is zero
    pub fn is_flat(&self) -> bool {
        self.y.iter().all(|v| *v == 0.0)
    }

    /// An interpolating spline through the distribution. Stations are spaced in arccos space
    /// since both thickness and camber grow like a square root close to the leading edge.
    pub fn spline(&self) -> Result<Spline1> {
        Spline1::build(&self.x, &self.y, Boundary::NotAKnot, KnotSpacing::Arccos)
    }

    /// Position and value of the largest magnitude. The station with the largest |y| is refined
    /// on the interpolating spline between its neighbours.
    pub fn high_point(&self) -> (f64, f64) {
        let i = self
            .y
            .iter()
            .position_max_by(|a, b| a.abs().total_cmp(&b.abs()))
            .unwrap_or(0);

        let n = self.x.len();
        if self.is_flat() || i == 0 || i == n - 1 {
            return (self.x[i], self.y[i]);
        }

        match self.spline() {
            Ok(s) => {
                let x = golden_section_max(|x| s.eval(x).abs(), self.x[i - 1], self.x[i + 1], 1e-10, 200);
                (x, s.eval(x))
            }
            Err(_) => (self.x[i], self.y[i]),
        }
    }

    /// The same stations with every value multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Distribution {
            kind: self.kind,
            x: self.x.clone(),
            y: self.y.iter().map(|v| v * factor).collect(),
        }
    }

    pub fn with_values(&self, y: Vec<f64>) -> Result<Self> {
        Distribution::new(self.kind, self.x.clone(), y)
    }
}

/// Where the thickness and camber distributions are sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stations {
    /// The x values of the upper surface vertices
    #[default]
    UpperSurface,

    /// A cosine distribution with the given number of stations
    Cosine(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecomposeParams {
    pub stations: Stations,

    /// A camber line whose magnitude stays below this value is set to zero
    pub camber_flush: f64,

    /// Thickness more negative than this is an invalid airfoil
    pub thickness_tolerance: f64,
}

impl Default for DecomposeParams {
    fn default() -> Self {
        DecomposeParams {
            stations: Stations::UpperSurface,
            camber_flush: 1e-5,
            thickness_tolerance: 1e-7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Decomposition {
    pub thickness: Distribution,
    pub camber: Distribution,

    /// Curvature of the upper surface at the leading edge
    pub le_curvature: f64,

    /// Traversal order of the decomposed airfoil, used again on reconstruction
    pub order: SurfaceOrder,
}

fn cosine_stations(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 * (1.0 - (PI * i as f64 / (n - 1) as f64).cos()))
        .collect()
}

/// Decomposes an airfoil into its thickness and camber distributions. The airfoil is normalized
/// first if it is not already, and any warning from that step is carried along.
pub fn decompose(airfoil: &Airfoil, params: &GeometryParams) -> Result<Outcome<Decomposition>> {
    let normalized = normalize(airfoil, params)?;
    let af = &normalized.value;

    let surfaces = af.surfaces(&params.le_search)?;
    let status = normalized.status.and(surfaces.status);
    let (upper, lower) = surfaces.value;

    let (x, y_upper): (Vec<f64>, Vec<f64>) = match params.decompose.stations {
        Stations::UpperSurface => {
            // Vertices doubling back in x (noisy noses) are skipped
            let mut x = Vec::new();
            let mut y = Vec::new();
            for p in af.upper() {
                if x.last().map_or(true, |last| p.x > *last) {
                    x.push(p.x);
                    y.push(p.y);
                }
            }
            (x, y)
        }
        Stations::Cosine(n) => {
            if n < 3 {
                return Err(GeometryError::InvalidParameter {
                    name: "stations",
                    value: n as f64,
                });
            }
            let x = cosine_stations(n);
            let y = x.iter().map(|v| upper.y_at_x(*v)).collect();
            (x, y)
        }
    };

    let lower_te = lower.point_at(1.0);
    let last = x.len() - 1;
    let y_lower: Vec<f64> = x
        .iter()
        .enumerate()
        .map(|(i, v)| match i {
            0 => y_upper[0],
            i if i == last => lower_te.y,
            _ => lower.y_at_x(*v),
        })
        .collect();

    let thickness: Vec<f64> = izip!(&y_upper, &y_lower).map(|(u, l)| u - l).collect();
    let mut camber: Vec<f64> = izip!(&y_upper, &y_lower).map(|(u, l)| 0.5 * (u + l)).collect();

    if camber.iter().all(|c| c.abs() < params.decompose.camber_flush) {
        camber.iter_mut().for_each(|c| *c = 0.0);
    }

    Ok(Outcome::with_status(
        Decomposition {
            thickness: Distribution::new(DistributionKind::Thickness, x.clone(), thickness)?,
            camber: Distribution::new(DistributionKind::Camber, x, camber)?,
            le_curvature: upper.curvature_at(0.0),
            order: af.order(),
        },
        status,
    ))
}

/// Rebuilds an airfoil from thickness and camber on the same stations. Upper surface points are
/// camber plus half the thickness, lower surface points camber minus half the thickness.
pub fn reconstruct(
    name: &str,
    thickness: &Distribution,
    camber: &Distribution,
    order: SurfaceOrder,
    params: &DecomposeParams,
) -> Result<Airfoil> {
    let same = thickness.x.len() == camber.x.len()
        && izip!(&thickness.x, &camber.x).all(|(a, b)| (a - b).abs() <= 1e-12);
    if !same {
        return Err(GeometryError::StationMismatch);
    }

    if let Some((x, _)) = izip!(&thickness.x, &thickness.y).find(|(_, t)| **t < -params.thickness_tolerance) {
        return Err(GeometryError::NegativeThickness { x: *x });
    }

    let (upper, lower): (Vec<Point2<f64>>, Vec<Point2<f64>>) = izip!(&thickness.x, &thickness.y, &camber.y)
        .map(|(x, t, c)| {
            let half = 0.5 * t.max(0.0);
            (Point2::new(*x, c + half), Point2::new(*x, c - half))
        })
        .unzip();

    Airfoil::from_sides(name, &upper, &lower, order)
}

impl Decomposition {
    /// Reassembles the airfoil these distributions were taken from
    pub fn reconstruct(&self, name: &str, params: &DecomposeParams) -> Result<Airfoil> {
        reconstruct(name, &self.thickness, &self.camber, self.order, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airfoil::generate::{AirfoilGenerator, Naca4Digit};
    use approx::assert_relative_eq;
    use test_case::test_case;

    fn params_with(stations: Stations) -> GeometryParams {
        let mut p = GeometryParams::default();
        p.decompose.stations = stations;
        p
    }

    #[test]
    fn symmetric_airfoil_has_flat_camber() {
        let af = Naca4Digit::new(0.12, 1.0, 0.0, 0.0).airfoil(61).unwrap();
        let d = decompose(&af, &GeometryParams::default()).unwrap().value;
        assert!(d.camber.is_flat());
        assert_relative_eq!(0.0, d.thickness.le_value());
        assert_relative_eq!(0.00252, d.thickness.te_value(), epsilon = 1e-6);
    }

    #[test_case(Stations::UpperSurface)]
    #[test_case(Stations::Cosine(101))]
    fn naca_0008_thickness_is_recovered(stations: Stations) {
        let af = Naca4Digit::new(0.08, 1.0, 0.0, 0.0).airfoil(81).unwrap();
        let d = decompose(&af, &params_with(stations)).unwrap().value;
        let (x, t) = d.thickness.high_point();
        assert_relative_eq!(0.08, t, epsilon = 1e-3);
        assert_relative_eq!(0.3, x, epsilon = 5e-3);
    }

    #[test]
    fn round_trip_reproduces_surfaces() {
        let params = GeometryParams::default();
        let af = Naca4Digit::new(0.12, 1.0, 0.02, 0.4).airfoil(81).unwrap();
        let n = normalize(&af, &params).unwrap().value;
        let d = decompose(&n, &params).unwrap().value;
        let back = d.reconstruct(n.name(), &params.decompose).unwrap();

        assert_eq!(n.order(), back.order());
        for (a, b) in n.upper().iter().zip(back.upper().iter()) {
            assert_relative_eq!(a.x, b.x, epsilon = 1e-12);
            assert_relative_eq!(a.y, b.y, epsilon = 1e-9);
        }

        // The lower surface was resampled at the upper stations
        let (_, lower) = back.surfaces(&params.le_search).unwrap().value;
        for p in n.lower().iter().skip(3) {
            assert_relative_eq!(p.y, lower.y_at_x(p.x), epsilon = 1e-4);
        }
    }

    #[test]
    fn camber_of_cambered_airfoil() {
        let af = Naca4Digit::new(0.12, 1.0, 0.02, 0.4).airfoil(81).unwrap();
        let d = decompose(&af, &GeometryParams::default()).unwrap().value;
        let (x, c) = d.camber.high_point();
        assert_relative_eq!(0.02, c, epsilon = 1e-3);
        assert_relative_eq!(0.4, x, epsilon = 0.03);
        assert!(d.le_curvature < 0.0);
    }

    #[test]
    fn mismatched_stations_are_rejected() {
        let t = Distribution::new(DistributionKind::Thickness, vec![0.0, 0.5, 1.0], vec![0.0, 0.1, 0.0]).unwrap();
        let c = Distribution::new(DistributionKind::Camber, vec![0.0, 0.4, 1.0], vec![0.0, 0.0, 0.0]).unwrap();
        let r = reconstruct("x", &t, &c, SurfaceOrder::LowerFirst, &DecomposeParams::default());
        assert_eq!(Err(GeometryError::StationMismatch), r);
    }

    #[test]
    fn negative_thickness_is_rejected() {
        let x = vec![0.0, 0.25, 0.5, 1.0];
        let t = Distribution::new(DistributionKind::Thickness, x.clone(), vec![0.0, 0.1, -0.01, 0.0]).unwrap();
        let c = Distribution::new(DistributionKind::Camber, x, vec![0.0; 4]).unwrap();
        let r = reconstruct("x", &t, &c, SurfaceOrder::LowerFirst, &DecomposeParams::default());
        assert_eq!(Err(GeometryError::NegativeThickness { x: 0.5 }), r);
    }

    #[test]
    fn deserialized_distribution_is_validated() {
        let d: Distribution =
            serde_json::from_str(r#"{"kind": "Camber", "x": [0.0, 0.5, 1.0], "y": [0.0, 0.02, 0.0]}"#).unwrap();
        assert_eq!(DistributionKind::Camber, d.kind());
        assert_eq!(&[0.0, 0.5, 1.0], d.x());

        let empty = serde_json::from_str::<Distribution>(r#"{"kind": "Thickness", "x": [], "y": []}"#);
        assert!(empty.is_err());
        let short = serde_json::from_str::<Distribution>(r#"{"kind": "Thickness", "x": [0.0, 1.0], "y": [0.0]}"#);
        assert!(short.is_err());
    }

    #[test]
    fn distribution_rejects_unordered_stations() {
        let r = Distribution::new(DistributionKind::Camber, vec![0.0, 0.5, 0.4, 1.0], vec![0.0; 4]);
        assert_eq!(Err(GeometryError::NotStrictlyIncreasing { index: 2 }), r);
    }
}

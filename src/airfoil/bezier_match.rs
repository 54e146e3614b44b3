//! Approximation of airfoil sides by Bezier curves. The free control point coordinates are found
//! by a downhill simplex search on the y deviation at a set of target stations, with extra terms
//! pulling the curvature at both ends towards the target.

use crate::airfoil::common::GeometryParams;
use crate::airfoil::normalize::normalize;
use crate::airfoil::panel::sampling_of;
use crate::airfoil::{Airfoil, BezierSides, Side};
use crate::algorithms::closest_index;
use crate::errors::{GeometryError, Outcome, Result, Status, Warning};
use crate::geometry::bezier::Bezier2;
use crate::geometry::curve2::Curve2;
use crate::optimize::{nelder_mead, SimplexParams};
use ncollide2d::na::Point2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Objective value of a control polygon which breaks a constraint
const PENALTY: f64 = 1e6;

/// Smallest magnitude of the start tangent control point in the initial guess
const MIN_TANGENT_Y: f64 = 0.025;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BezierFitParams {
    /// Number of control points per side, including both end points
    pub control_points: usize,

    /// The y deviation which counts as 1 in the objective
    pub deviation_scale: f64,

    pub le_weight: f64,
    pub te_weight: f64,

    /// Weight of the leading edge curvature difference between the two sides
    pub link_weight: f64,

    /// Bounds of the free x coordinates
    pub x_min: f64,
    pub x_max: f64,
}

impl Default for BezierFitParams {
    fn default() -> Self {
        BezierFitParams {
            control_points: 6,
            deviation_scale: 1e-3,
            le_weight: 100.0,
            te_weight: 1.0,
            link_weight: 100.0,
            x_min: 0.01,
            x_max: 0.95,
        }
    }
}

/// The stations of one airfoil side a Bezier curve is fitted to, together with the curvature at
/// both of its ends
#[derive(Debug, Clone, PartialEq)]
pub struct FitTarget {
    pub side: Side,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub y_te: f64,
    pub le_curvature: f64,
    pub te_curvature: f64,
}

impl FitTarget {
    /// Picks the target stations from the samples of a side, given from the leading edge to the
    /// trailing edge. The stations start at x = 0.02 and are a little denser behind x = 0.8.
    pub fn new(side: Side, samples: &[Point2<f64>], le_curvature: f64, te_curvature: f64) -> Result<Self> {
        if samples.len() < 3 {
            return Err(GeometryError::NotEnoughPoints {
                needed: 3,
                found: samples.len(),
            });
        }
        if let Some(index) = samples.windows(2).position(|w| w[1].x <= w[0].x) {
            return Err(GeometryError::NotStrictlyIncreasing { index: index + 1 });
        }

        let xs: Vec<f64> = samples.iter().map(|p| p.x).collect();
        let mut x = Vec::new();
        let mut y = Vec::new();
        let mut station = 0.02;
        while station < 1.0 {
            let i = closest_index(&xs, station);
            x.push(samples[i].x);
            y.push(samples[i].y);
            station += if station > 0.8 { 0.03 } else { 0.04 };
        }

        Ok(FitTarget {
            side,
            x,
            y,
            y_te: samples[samples.len() - 1].y,
            le_curvature,
            te_curvature,
        })
    }

    /// The target for one side of a normalized airfoil
    pub fn from_airfoil(airfoil: &Airfoil, side: Side, params: &GeometryParams) -> Result<Outcome<Self>> {
        let surfaces = airfoil.surfaces(&params.le_search)?;
        let (upper, lower) = &surfaces.value;
        let (curve, samples) = match side {
            Side::Upper => (upper, airfoil.upper()),
            Side::Lower => (lower, airfoil.lower()),
        };

        let target = FitTarget::new(side, &samples, curve.curvature_at(0.0), curve.curvature_at(1.0))?;
        Ok(Outcome::with_status(target, surfaces.status))
    }

    fn n(&self) -> usize {
        self.x.len()
    }
}

/// A control polygon close to the target side. The end points and the start tangent are fixed by
/// construction, the interior points sit a little beyond the target stations they are taken from.
pub fn initial_guess(target: &FitTarget, control_points: usize) -> Result<Bezier2> {
    if control_points < 3 {
        return Err(GeometryError::InvalidParameter {
            name: "control_points",
            value: control_points as f64,
        });
    }

    let sign = target.side.sign();
    let flipped: Vec<f64> = target.y.iter().map(|y| y * sign).collect();
    let between = control_points - 3;

    let y_factor = match control_points {
        6 => 1.2,
        5 => 1.3,
        4 => 1.6,
        _ => 1.15,
    };
    let dx = if between == 1 { 0.35 } else { 1.0 / (between + 1) as f64 };

    let mut interior: Vec<(f64, f64)> = Vec::with_capacity(between);
    let mut station = 0.0;
    let mut prev_x = 0.0;
    for k in 0..between {
        station += dx;
        let i = closest_index(&target.x, station);
        // Sparse targets can map two stations onto the same point
        let x = target.x[i].max(prev_x + 0.01);
        let factor = if k == 0 { y_factor * 1.2 } else { y_factor };
        interior.push((x, flipped[i] * factor));
        prev_x = x;
    }

    let tangent = match interior.first() {
        None => flipped.iter().copied().fold(f64::MIN, f64::max) * 1.8,
        Some((x2, _)) => flipped[closest_index(&target.x, 0.6 * x2)],
    }
    .max(MIN_TANGENT_Y);

    let mut points = Vec::with_capacity(control_points);
    points.push(Point2::new(0.0, 0.0));
    points.push(Point2::new(0.0, tangent * sign));
    points.extend(interior.iter().map(|(x, y)| Point2::new(*x, y * sign)));
    points.push(Point2::new(1.0, target.y_te));
    Bezier2::new(points)
}

/// The result of fitting one side
#[derive(Debug, Clone)]
pub struct BezierFit {
    pub bezier: Bezier2,
    pub objective: f64,

    /// Root mean square of the y deviation at the target stations
    pub deviation: f64,

    pub evaluations: usize,
    pub iterations: usize,
    pub le_curvature: f64,
}

/// The objective of one side over the free coordinates: the y of the start tangent point
/// followed by (x, y) of every interior point, with y measured away from the chord.
struct SideObjective<'a> {
    target: &'a FitTarget,
    params: &'a BezierFitParams,
    control_points: usize,
    link: Option<f64>,
}

impl<'a> SideObjective<'a> {
    fn variables(&self, bezier: &Bezier2) -> Vec<f64> {
        let sign = self.target.side.sign();
        let pts = bezier.points();
        let mut vars = vec![pts[1].y * sign];
        for p in &pts[2..pts.len() - 1] {
            vars.push(p.x);
            vars.push(p.y * sign);
        }
        vars
    }

    fn bezier(&self, vars: &[f64]) -> Result<Bezier2> {
        let sign = self.target.side.sign();
        let mut points = Vec::with_capacity(self.control_points);
        points.push(Point2::new(0.0, 0.0));
        points.push(Point2::new(0.0, vars[0] * sign));
        points.extend(vars[1..].chunks(2).map(|c| Point2::new(c[0], c[1] * sign)));
        points.push(Point2::new(1.0, self.target.y_te));
        Bezier2::new(points)
    }

    /// Summed amount by which the variables break the constraints, None if they hold
    fn violation(&self, vars: &[f64]) -> Option<f64> {
        let mut amount = 0.0;
        let mut violated = false;

        if vars[0] <= 0.0 {
            violated = true;
            amount -= vars[0];
        }

        let mut prev_x = 0.0;
        for c in vars[1..].chunks(2) {
            let x = c[0];
            if x < self.params.x_min {
                violated = true;
                amount += self.params.x_min - x;
            }
            if x > self.params.x_max {
                violated = true;
                amount += x - self.params.x_max;
            }
            if x <= prev_x {
                violated = true;
                amount += prev_x - x;
            }
            prev_x = x;
        }

        violated.then_some(amount)
    }

    fn deviation_sum(&self, bezier: &Bezier2) -> f64 {
        self.target
            .x
            .iter()
            .zip(&self.target.y)
            .map(|(x, y)| (bezier.y_at_x(*x) - y).powi(2))
            .sum()
    }

    fn value(&self, vars: &[f64]) -> f64 {
        if let Some(amount) = self.violation(vars) {
            return PENALTY * (1.0 + amount);
        }
        let bezier = match self.bezier(vars) {
            Ok(b) => b,
            Err(_) => return f64::INFINITY,
        };

        let p = self.params;
        let t = self.target;
        let scale = p.deviation_scale * p.deviation_scale * t.n() as f64;
        let mut value = self.deviation_sum(&bezier) / scale;

        let le = bezier.curvature_at(0.0).abs();
        let le_target = t.le_curvature.abs();
        value += p.le_weight * ((le - le_target) / le_target.max(1.0)).powi(2);

        let te = bezier.curvature_at(1.0);
        value += p.te_weight * ((te - t.te_curvature) / t.te_curvature.abs().max(1.0)).powi(2);

        if let Some(other) = self.link {
            value += p.link_weight * ((le - other) / other.max(1.0)).powi(2);
        }
        value
    }
}

fn check_params(params: &BezierFitParams) -> Result<()> {
    if params.control_points < 3 {
        return Err(GeometryError::InvalidParameter {
            name: "control_points",
            value: params.control_points as f64,
        });
    }
    if !(params.deviation_scale > 0.0) {
        return Err(GeometryError::InvalidParameter {
            name: "deviation_scale",
            value: params.deviation_scale,
        });
    }
    if !(params.x_min > 0.0 && params.x_min < params.x_max && params.x_max < 1.0) {
        return Err(GeometryError::InvalidParameter {
            name: "x_max",
            value: params.x_max,
        });
    }
    Ok(())
}

fn run_fit(
    target: &FitTarget,
    fit: &BezierFitParams,
    simplex: &SimplexParams,
    link: Option<f64>,
) -> Result<Outcome<BezierFit>> {
    check_params(fit)?;

    let objective = SideObjective {
        target,
        params: fit,
        control_points: fit.control_points,
        link,
    };
    let start = objective.variables(&initial_guess(target, fit.control_points)?);
    let result = nelder_mead(|v| objective.value(v), &start, simplex);

    let bezier = objective.bezier(&result.x)?;
    let fitted = BezierFit {
        deviation: (objective.deviation_sum(&bezier) / target.n() as f64).sqrt(),
        le_curvature: bezier.curvature_at(0.0),
        bezier,
        objective: result.value,
        evaluations: result.evaluations,
        iterations: result.iterations,
    };
    debug!(
        side = ?target.side,
        evaluations = fitted.evaluations,
        objective = fitted.objective,
        deviation = fitted.deviation,
        "bezier fit"
    );

    if result.converged {
        Ok(Outcome::success(fitted))
    } else {
        warn!(side = ?target.side, evaluations = result.evaluations, "bezier fit did not converge");
        let warning = Warning::SimplexNotConverged {
            evaluations: result.evaluations,
            objective: result.value,
        };
        Ok(Outcome::warning(fitted, warning))
    }
}

/// Fits a Bezier curve with `params.bezier_fit.control_points` points to one target side
pub fn fit_side(target: &FitTarget, params: &GeometryParams) -> Result<Outcome<BezierFit>> {
    run_fit(target, &params.bezier_fit, &params.simplex, None)
}

/// Fits both sides. The upper side is fitted first, the lower fit is then also pulled towards
/// the leading edge curvature of the fitted upper curve so both sides meet smoothly.
pub fn fit_both(
    upper: &FitTarget,
    lower: &FitTarget,
    params: &GeometryParams,
) -> Result<Outcome<(BezierFit, BezierFit)>> {
    let upper_fit = fit_side(upper, params)?;
    let link = upper_fit.value.le_curvature.abs();
    let lower_fit = run_fit(lower, &params.bezier_fit, &params.simplex, Some(link))?;

    let status = upper_fit.status.and(lower_fit.status);
    Ok(Outcome::with_status((upper_fit.value, lower_fit.value), status))
}

/// Replaces an airfoil by a Bezier-backed one which approximates its normalized shape. The new
/// airfoil keeps the number of points per side and the traversal order.
pub fn match_bezier(airfoil: &Airfoil, params: &GeometryParams) -> Result<Outcome<Airfoil>> {
    let normalized = normalize(airfoil, params)?;
    let af = &normalized.value;

    let upper = FitTarget::from_airfoil(af, Side::Upper, params)?;
    let lower = FitTarget::from_airfoil(af, Side::Lower, params)?;
    let fits = fit_both(&upper.value, &lower.value, params)?;
    let (upper_fit, lower_fit) = fits.value;

    let sides = BezierSides {
        upper: upper_fit.bezier,
        lower: lower_fit.bezier,
    };
    let (points_per_side, order) = sampling_of(af);
    let matched = Airfoil::from_bezier(af.name(), sides, points_per_side, order)?;

    let status: Status = normalized
        .status
        .and(upper.status)
        .and(lower.status)
        .and(fits.status);
    Ok(Outcome::with_status(matched, status))
}

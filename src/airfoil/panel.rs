//! Panel distributions along the surface parameter and repaneling of airfoils.

use crate::airfoil::common::GeometryParams;
use crate::airfoil::normalize::normalize;
use crate::airfoil::{Airfoil, SurfaceOrder};
use crate::errors::{GeometryError, Outcome, Result};
use crate::geometry::curve2::Curve2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelParams {
    pub n_panels: usize,

    /// Clustering at the leading edge, 0 for none and 1 for a full cosine bunch
    pub le_bunch: f64,

    /// Clustering at the trailing edge, 0 for none and 1 for the strongest
    pub te_bunch: f64,
}

impl Default for PanelParams {
    fn default() -> Self {
        PanelParams {
            n_panels: 160,
            le_bunch: 0.84,
            te_bunch: 0.7,
        }
    }
}

fn normalized_cumsum(du: &[f64]) -> Vec<f64> {
    let mut u = Vec::with_capacity(du.len() + 1);
    u.push(0.0);
    for d in du {
        u.push(u[u.len() - 1] + d);
    }
    let total = u[u.len() - 1];
    u.iter_mut().for_each(|v| *v /= total);
    u
}

/// A cosine-like distribution of `n_points` parameters from 0 (leading edge) to 1 (trailing
/// edge). The panels at the trailing edge are shrunk to a fraction of their cosine size and grow
/// geometrically upstream until they reach it.
pub fn cosine_distribution(n_points: usize, le_bunch: f64, te_bunch: f64) -> Result<Vec<f64>> {
    if n_points < 3 {
        return Err(GeometryError::NotEnoughPoints {
            needed: 3,
            found: n_points,
        });
    }

    let start = (0.1 - le_bunch * 0.1).clamp(0.0, 0.5);
    let end = 0.65;
    let u: Vec<f64> = (0..n_points)
        .map(|i| {
            let beta = (start + (end - start) * i as f64 / (n_points - 1) as f64) * PI;
            0.5 * (1.0 - beta.cos())
        })
        .collect();

    let mut du: Vec<f64> = u.windows(2).map(|w| w[1] - w[0]).collect();

    let growth = 1.2;
    let mut ip = du.len() - 1;
    let mut size = (1.0 - te_bunch * 0.9) * du[ip];
    while size < du[ip] {
        du[ip] = size;
        if ip == 0 {
            break;
        }
        ip -= 1;
        size *= growth;
    }

    Ok(normalized_cumsum(&du))
}

/// The parameter distribution for sampling Bezier sides. A Bezier curve already bunches points
/// where its curvature is high, so only the first and last panels are shrunk a little.
pub fn bezier_distribution(n_points: usize) -> Result<Vec<f64>> {
    if n_points < 3 {
        return Err(GeometryError::NotEnoughPoints {
            needed: 3,
            found: n_points,
        });
    }

    let mut du = vec![1.0; n_points - 1];
    let last = du.len() - 1;

    let mut size = 0.8;
    let mut ip = 0;
    while size < 1.0 && ip <= last {
        du[ip] = size;
        ip += 1;
        size *= 1.1;
    }

    let mut size = 0.5;
    let mut ip = last;
    while size < 1.0 {
        du[ip] = size;
        if ip == 0 {
            break;
        }
        ip -= 1;
        size *= 1.4;
    }

    Ok(normalized_cumsum(&du))
}

/// Redistributes the points of an airfoil along its contour. An odd number of panels gives the
/// upper surface one panel more than the lower. The leading edge remains a vertex.
pub fn repanel(airfoil: &Airfoil, panel: &PanelParams, params: &GeometryParams) -> Result<Outcome<Airfoil>> {
    if panel.n_panels < 6 {
        return Err(GeometryError::InvalidParameter {
            name: "n_panels",
            value: panel.n_panels as f64,
        });
    }

    let n_lower = panel.n_panels / 2;
    let n_upper = panel.n_panels - n_lower;

    if let Some(sides) = airfoil.bezier() {
        // Both sides are sampled alike so the upper surface count decides
        return Ok(Outcome::success(Airfoil::from_bezier(
            airfoil.name(),
            sides.clone(),
            n_upper + 1,
            airfoil.order(),
        )?));
    }

    let surfaces = airfoil.surfaces(&params.le_search)?;
    let (upper, lower) = &surfaces.value;

    let u_upper = cosine_distribution(n_upper + 1, panel.le_bunch, panel.te_bunch)?;
    let u_lower = cosine_distribution(n_lower + 1, panel.le_bunch, panel.te_bunch)?;
    let upper_points = upper.sample(&u_upper);
    let lower_points = lower.sample(&u_lower);
    debug!(n_upper, n_lower, "repanel");

    let rebuilt = Airfoil::from_sides(airfoil.name(), &upper_points, &lower_points, airfoil.order())?;
    let normalized = normalize(&rebuilt, params)?;
    Ok(Outcome::with_status(
        normalized.value,
        surfaces.status.and(normalized.status),
    ))
}

/// Points per side and traversal order an airfoil sampled from Bezier curves should keep
pub fn sampling_of(airfoil: &Airfoil) -> (usize, SurfaceOrder) {
    (airfoil.upper().len().max(3), airfoil.order())
}

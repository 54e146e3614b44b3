use crate::algorithms::{preceding_index_search, solve_tridiagonal};
use crate::errors::{GeometryError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_2_PI;

/// Boundary condition at both ends of a cubic spline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Boundary {
    /// Second derivative is zero at the ends
    Natural,

    /// The third derivative is continuous across the first and last interior knot
    #[default]
    NotAKnot,
}

/// How the knot values are spaced before the polynomials are fitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KnotSpacing {
    #[default]
    Linear,

    /// Knots in [0, 1] are mapped through acos(1 - x) * 2 / pi, which stretches the region close
    /// to x = 0. Distributions with a square root like behavior at the leading edge interpolate
    /// without oscillation in this space.
    Arccos,
}

fn arccos_map(x: f64) -> f64 {
    (1.0 - x).clamp(-1.0, 1.0).acos() * FRAC_2_PI
}

/// A cubic spline through a set of (x, y) knots with strictly increasing x
#[derive(Debug, Clone)]
pub struct Spline1 {
    knots: Vec<f64>,
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
    spacing: KnotSpacing,
}

impl Spline1 {
    pub fn new(x: &[f64], y: &[f64], boundary: Boundary) -> Result<Self> {
        Self::build(x, y, boundary, KnotSpacing::Linear)
    }

    pub fn build(x: &[f64], y: &[f64], boundary: Boundary, spacing: KnotSpacing) -> Result<Self> {
        let n = x.len();
        if n != y.len() {
            return Err(GeometryError::LengthMismatch(n, y.len()));
        }

        let needed = match boundary {
            Boundary::Natural => 3,
            Boundary::NotAKnot => 4,
        };
        if n < needed {
            return Err(GeometryError::NotEnoughPoints { needed, found: n });
        }

        if let Some(index) = x.iter().chain(y).position(|v| !v.is_finite()) {
            return Err(GeometryError::InvalidCoordinate { index: index % n });
        }

        let knots: Vec<f64> = match spacing {
            KnotSpacing::Linear => x.to_vec(),
            KnotSpacing::Arccos => x.iter().map(|v| arccos_map(*v)).collect(),
        };

        let h: Vec<f64> = knots.windows(2).map(|w| w[1] - w[0]).collect();
        if let Some(index) = h.iter().position(|hi| *hi <= 0.0) {
            return Err(GeometryError::NotStrictlyIncreasing { index: index + 1 });
        }

        let m = second_derivatives(&h, y, boundary)?;

        let segments = n - 1;
        let mut a = Vec::with_capacity(segments);
        let mut b = Vec::with_capacity(segments);
        let mut c = Vec::with_capacity(segments);
        let mut d = Vec::with_capacity(segments);
        for i in 0..segments {
            a.push(y[i]);
            b.push((y[i + 1] - y[i]) / h[i] - h[i] * (2.0 * m[i] + m[i + 1]) / 6.0);
            c.push(m[i] / 2.0);
            d.push((m[i + 1] - m[i]) / (6.0 * h[i]));
        }

        Ok(Spline1 {
            knots,
            a,
            b,
            c,
            d,
            spacing,
        })
    }

    pub fn x_min(&self) -> f64 {
        self.unmap(self.knots[0])
    }

    pub fn x_max(&self) -> f64 {
        self.unmap(*self.knots.last().unwrap_or(&0.0))
    }

    fn unmap(&self, t: f64) -> f64 {
        match self.spacing {
            KnotSpacing::Linear => t,
            KnotSpacing::Arccos => 1.0 - (t / FRAC_2_PI).cos(),
        }
    }

    fn locate(&self, x: f64) -> (usize, f64) {
        let t = match self.spacing {
            KnotSpacing::Linear => x,
            KnotSpacing::Arccos => arccos_map(x),
        };
        let t = t.clamp(self.knots[0], self.knots[self.knots.len() - 1]);
        let j = preceding_index_search(&self.knots, t).min(self.a.len() - 1);
        (j, t - self.knots[j])
    }

    /// Value of the spline at x, clamped to the knot range
    pub fn eval(&self, x: f64) -> f64 {
        let (j, z) = self.locate(x);
        self.a[j] + z * (self.b[j] + z * (self.c[j] + z * self.d[j]))
    }

    /// Derivative of the given order with respect to the knot variable. With arccos spacing the
    /// chain rule is applied for the first derivative only.
    pub fn derivative(&self, x: f64, order: usize) -> f64 {
        let (j, z) = self.locate(x);
        let raw = match order {
            0 => return self.eval(x),
            1 => self.b[j] + z * (2.0 * self.c[j] + 3.0 * self.d[j] * z),
            2 => 2.0 * self.c[j] + 6.0 * self.d[j] * z,
            3 => 6.0 * self.d[j],
            _ => 0.0,
        };

        match (self.spacing, order) {
            (KnotSpacing::Arccos, 1) => {
                let s = (x * (2.0 - x)).max(f64::EPSILON).sqrt();
                raw * FRAC_2_PI / s
            }
            _ => raw,
        }
    }
}

/// Solves for the second derivatives M at every knot
fn second_derivatives(h: &[f64], y: &[f64], boundary: Boundary) -> Result<Vec<f64>> {
    let n = y.len();
    let inner = n - 2;

    let mut sub = vec![0.0; inner];
    let mut diag = vec![0.0; inner];
    let mut sup = vec![0.0; inner];
    let mut rhs = vec![0.0; inner];

    for k in 0..inner {
        let i = k + 1;
        sub[k] = h[i - 1];
        diag[k] = 2.0 * (h[i - 1] + h[i]);
        sup[k] = h[i];
        rhs[k] = 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
    }

    if boundary == Boundary::NotAKnot {
        // M0 and M(n-1) are eliminated through the continuity of the third derivative
        let (h0, h1) = (h[0], h[1]);
        diag[0] = (h0 + h1) * (h0 + 2.0 * h1) / h1;
        sup[0] = (h1 * h1 - h0 * h0) / h1;

        let (ha, hb) = (h[n - 3], h[n - 2]);
        let last = inner - 1;
        sub[last] = (ha * ha - hb * hb) / ha;
        diag[last] = (ha + hb) * (2.0 * ha + hb) / ha;
    }

    let inner_m = solve_tridiagonal(&sub, &diag, &sup, &rhs)
        .ok_or(GeometryError::SingularSystem)?;

    let mut m = vec![0.0; n];
    m[1..n - 1].copy_from_slice(&inner_m);

    if boundary == Boundary::NotAKnot {
        m[0] = ((h[0] + h[1]) * m[1] - h[0] * m[2]) / h[1];
        m[n - 1] = ((h[n - 3] + h[n - 2]) * m[n - 2] - h[n - 2] * m[n - 3]) / h[n - 3];
    }

    Ok(m)
}

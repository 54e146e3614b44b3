//! Derivative free minimization with the Nelder-Mead downhill simplex method.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters of the simplex search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplexParams {
    /// Size of the initial simplex along each coordinate axis
    pub step: f64,

    /// The search has settled when the best value improves by less than this fraction of
    /// itself, or by less than this amount once the value is below one
    pub tolerance: f64,

    /// Number of consecutive iterations without improvement before the search stops
    pub no_improve_break: usize,

    /// Hard cap on objective evaluations
    pub max_evaluations: usize,

    /// When set, the initial step along each axis is scaled by a random factor in [0.5, 1.5)
    /// drawn from a generator seeded with this value
    pub seed: Option<u64>,

    pub reflection: f64,
    pub expansion: f64,
    pub contraction: f64,
    pub shrink: f64,
}

impl Default for SimplexParams {
    fn default() -> Self {
        SimplexParams {
            step: 0.1,
            tolerance: 1e-6,
            no_improve_break: 30,
            max_evaluations: 2000,
            seed: None,
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimplexResult {
    pub x: Vec<f64>,
    pub value: f64,
    pub evaluations: usize,
    pub iterations: usize,
    pub converged: bool,
}

struct Vertex {
    x: Vec<f64>,
    value: f64,
}

struct Counted<F> {
    f: F,
    evaluations: usize,
}

impl<F: FnMut(&[f64]) -> f64> Counted<F> {
    fn eval(&mut self, x: Vec<f64>) -> Vertex {
        self.evaluations += 1;
        let value = (self.f)(&x);
        // NaN would poison the ordering, treat it as an infinitely bad point
        let value = if value.is_nan() { f64::INFINITY } else { value };
        Vertex { x, value }
    }
}

fn combine(a: &[f64], b: &[f64], factor: f64) -> Vec<f64> {
    a.iter().zip(b).map(|(ai, bi)| ai + factor * (ai - bi)).collect()
}

/// Minimizes `f` starting from `start`. The search never fails: when the evaluation budget runs
/// out the best vertex found so far is returned with `converged == false`.
pub fn nelder_mead(f: impl FnMut(&[f64]) -> f64, start: &[f64], params: &SimplexParams) -> SimplexResult {
    let dim = start.len();
    let mut counted = Counted { f, evaluations: 0 };

    let mut rng = params.seed.map(StdRng::seed_from_u64);
    let mut simplex = vec![counted.eval(start.to_vec())];
    for i in 0..dim {
        let factor = match rng.as_mut() {
            Some(r) => r.gen_range(0.5..1.5),
            None => 1.0,
        };
        let mut x = start.to_vec();
        x[i] += params.step * factor;
        simplex.push(counted.eval(x));
    }

    let mut prev_best = simplex[0].value;
    let mut no_improve = 0;
    let mut iterations = 0;
    let mut converged = false;

    loop {
        simplex.sort_by(|a, b| a.value.total_cmp(&b.value));
        let best = simplex[0].value;

        if counted.evaluations >= params.max_evaluations {
            break;
        }

        let threshold = params.tolerance * prev_best.abs().max(1.0);
        if (prev_best - best).abs() <= threshold {
            no_improve += 1;
        } else {
            no_improve = 0;
            prev_best = best;
        }

        if no_improve >= params.no_improve_break || dim == 0 {
            converged = true;
            break;
        }

        if iterations % 100 == 0 {
            debug!(iterations, evaluations = counted.evaluations, best, "simplex progress");
        }
        iterations += 1;

        // Centroid of all but the worst vertex
        let mut centroid = vec![0.0; dim];
        for v in simplex.iter().take(dim) {
            for (c, xi) in centroid.iter_mut().zip(&v.x) {
                *c += xi / dim as f64;
            }
        }

        let worst = &simplex[dim];
        let reflected = counted.eval(combine(&centroid, &worst.x, params.reflection));

        if reflected.value >= simplex[0].value && reflected.value < simplex[dim - 1].value {
            simplex[dim] = reflected;
            continue;
        }

        if reflected.value < simplex[0].value {
            let expanded = counted.eval(combine(&centroid, &worst.x, params.expansion));
            simplex[dim] = if expanded.value < reflected.value {
                expanded
            } else {
                reflected
            };
            continue;
        }

        let contracted = counted.eval(combine(&centroid, &simplex[dim].x, -params.contraction));
        if contracted.value < simplex[dim].value {
            simplex[dim] = contracted;
            continue;
        }

        // Shrink towards the best vertex
        let best_x = simplex[0].x.clone();
        for i in 1..simplex.len() {
            let x: Vec<f64> = best_x
                .iter()
                .zip(&simplex[i].x)
                .map(|(b, xi)| b + params.shrink * (xi - b))
                .collect();
            simplex[i] = counted.eval(x);
        }
    }

    let best = simplex.swap_remove(0);
    SimplexResult {
        x: best.x,
        value: best.value,
        evaluations: counted.evaluations,
        iterations,
        converged,
    }
}

use ncollide2d::na::RealField;

/// Finds the index `i` of the last value in a sorted slice for which `slice[i] <= test_value`,
/// clamped to 0 for values below the first entry.
pub fn preceding_index_search<N: RealField + Copy>(slice: &[N], test_value: N) -> usize {
    if slice.len() <= 1 || slice[1] > test_value {
        return 0;
    }

    let mut a = 1;
    let mut b = slice.len() - 1;
    if slice[b] <= test_value {
        return b;
    }

    while b > a + 1 {
        let check = (a + b) / 2;
        if test_value >= slice[check] {
            a = check;
        } else {
            b = check;
        }
    }
    a
}

/// Index of the value in a sorted slice which is closest to `value`. Ties go to the smaller one.
pub fn closest_index(slice: &[f64], value: f64) -> usize {
    if slice.is_empty() {
        return 0;
    }
    let i = preceding_index_search(slice, value);
    if i + 1 < slice.len() && (slice[i + 1] - value) < (value - slice[i]) {
        i + 1
    } else {
        i
    }
}

/// Solves a tridiagonal system with the Thomas algorithm. `sub[k]` is the coefficient left of
/// the diagonal in row `k` (ignored for row 0), `sup[k]` the one right of it (ignored for the
/// last row). Returns None if a pivot vanishes.
pub fn solve_tridiagonal(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> Option<Vec<f64>> {
    let n = diag.len();
    if n == 0 {
        return Some(Vec::new());
    }

    let mut c = vec![0.0; n];
    let mut d = vec![0.0; n];

    if diag[0].abs() < f64::EPSILON {
        return None;
    }
    c[0] = sup[0] / diag[0];
    d[0] = rhs[0] / diag[0];

    for k in 1..n {
        let m = diag[k] - sub[k] * c[k - 1];
        if m.abs() < f64::EPSILON {
            return None;
        }
        c[k] = if k < n - 1 { sup[k] / m } else { 0.0 };
        d[k] = (rhs[k] - sub[k] * d[k - 1]) / m;
    }

    let mut x = d;
    for k in (0..n - 1).rev() {
        x[k] -= c[k] * x[k + 1];
    }
    Some(x)
}

/// Bisection for a root of `f` in [a, b]. Returns None if `f(a)` and `f(b)` have the same sign.
pub fn bisection(f: impl Fn(f64) -> f64, a: f64, b: f64, tol: f64, max_iter: usize) -> Option<f64> {
    let mut lo = a;
    let mut hi = b;
    let mut f_lo = f(lo);
    let f_hi = f(hi);

    if f_lo == 0.0 {
        return Some(lo);
    }
    if f_hi == 0.0 {
        return Some(hi);
    }
    if f_lo * f_hi > 0.0 {
        return None;
    }

    for _ in 0..max_iter {
        let mid = 0.5 * (lo + hi);
        if (hi - lo).abs() < tol {
            return Some(mid);
        }
        let f_mid = f(mid);
        if f_mid == 0.0 {
            return Some(mid);
        }
        if f_lo * f_mid < 0.0 {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }

    Some(0.5 * (lo + hi))
}

const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Golden-section search for the maximum of a unimodal function on [a, b]
pub fn golden_section_max(f: impl Fn(f64) -> f64, a: f64, b: f64, tol: f64, max_iter: usize) -> f64 {
    let mut lo = a.min(b);
    let mut hi = a.max(b);

    let mut x1 = hi - INV_PHI * (hi - lo);
    let mut x2 = lo + INV_PHI * (hi - lo);
    let mut f1 = f(x1);
    let mut f2 = f(x2);

    for _ in 0..max_iter {
        if (hi - lo) < tol {
            break;
        }
        if f1 < f2 {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + INV_PHI * (hi - lo);
            f2 = f(x2);
        } else {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - INV_PHI * (hi - lo);
            f1 = f(x1);
        }
    }

    0.5 * (lo + hi)
}

/// Inverts a monotonically increasing function on [a, b], finding `t` with `f(t) = target`.
/// Newton steps are taken where the derivative allows it and fall back to bisection otherwise,
/// so the iterate never leaves the bracket. Targets outside of the range are clamped.
pub fn invert_monotonic(
    f: impl Fn(f64) -> f64,
    df: impl Fn(f64) -> f64,
    target: f64,
    a: f64,
    b: f64,
    tol: f64,
    max_iter: usize,
) -> f64 {
    let mut lo = a;
    let mut hi = b;
    let f_lo = f(lo) - target;
    let f_hi = f(hi) - target;

    if f_lo >= 0.0 {
        return lo;
    }
    if f_hi <= 0.0 {
        return hi;
    }

    // Initial guess by linear interpolation between the bracket ends
    let mut t = lo + (hi - lo) * (-f_lo) / (f_hi - f_lo);
    for _ in 0..max_iter {
        let ft = f(t) - target;
        if ft.abs() < tol {
            return t;
        }
        if ft < 0.0 {
            lo = t;
        } else {
            hi = t;
        }

        let d = df(t);
        let newton = if d.abs() > f64::EPSILON { t - ft / d } else { f64::NAN };
        t = if newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };

        if hi - lo < tol * 1e-3 {
            break;
        }
    }
    t
}

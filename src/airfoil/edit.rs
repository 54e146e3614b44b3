//! Targeted edits of an airfoil through its thickness and camber distributions. Every edit
//! returns a new, normalized airfoil.

use crate::airfoil::common::GeometryParams;
use crate::airfoil::decompose::{decompose, reconstruct, Distribution, DistributionKind, Stations};
use crate::airfoil::highpoint::{remap_high_point, with_max};
use crate::airfoil::normalize::normalize;
use crate::airfoil::{Airfoil, BezierSides};
use crate::errors::{GeometryError, Outcome, Result};
use itertools::izip;
use ncollide2d::na::Point2;
use tracing::debug;

/// Exponent cap of the blending functions, beyond it the influence is negligible
const MAX_EXPONENT: f64 = 15.0;

fn edit_distributions(
    airfoil: &Airfoil,
    params: &GeometryParams,
    edit: impl FnOnce(&Distribution, &Distribution) -> Result<(Distribution, Distribution)>,
) -> Result<Outcome<Airfoil>> {
    let decomposed = decompose(airfoil, params)?;
    let d = &decomposed.value;
    let (thickness, camber) = edit(&d.thickness, &d.camber)?;

    let rebuilt = reconstruct(airfoil.name(), &thickness, &camber, d.order, &params.decompose)?;
    let normalized = normalize(&rebuilt, params)?;
    Ok(Outcome::with_status(
        normalized.value,
        decomposed.status.and(normalized.status),
    ))
}

pub fn set_max_thickness(airfoil: &Airfoil, value: f64, params: &GeometryParams) -> Result<Outcome<Airfoil>> {
    edit_distributions(airfoil, params, |t, c| Ok((with_max(t, value)?, c.clone())))
}

pub fn set_max_camber(airfoil: &Airfoil, value: f64, params: &GeometryParams) -> Result<Outcome<Airfoil>> {
    edit_distributions(airfoil, params, |t, c| Ok((t.clone(), with_max(c, value)?)))
}

/// Moves the chord position of the thickness or camber high point to `x`
pub fn set_high_point(
    airfoil: &Airfoil,
    kind: DistributionKind,
    x: f64,
    params: &GeometryParams,
) -> Result<Outcome<Airfoil>> {
    edit_distributions(airfoil, params, |t, c| match kind {
        DistributionKind::Thickness => Ok((remap_high_point(t, x)?, c.clone())),
        DistributionKind::Camber => Ok((t.clone(), remap_high_point(c, x)?)),
    })
}

fn check_blend(blend: f64) -> Result<()> {
    if blend > 0.0 && blend <= 1.0 {
        Ok(())
    } else {
        Err(GeometryError::InvalidParameter { name: "blend", value: blend })
    }
}

/// Sets the trailing edge gap to `gap`. The thickness changes by the gap difference times a
/// factor which is 1 at the trailing edge and decays towards the leading edge, the faster the
/// smaller `blend` is. A `blend` of 0 moves the trailing edge points only. A Bezier-backed
/// airfoil moves the end points of its curves instead.
pub fn set_te_gap(airfoil: &Airfoil, gap: f64, blend: f64, params: &GeometryParams) -> Result<Outcome<Airfoil>> {
    if !(gap >= 0.0 && gap.is_finite()) {
        return Err(GeometryError::InvalidParameter { name: "te_gap", value: gap });
    }
    if blend != 0.0 {
        check_blend(blend)?;
    }

    if let Some(sides) = airfoil.bezier() {
        let upper_te = sides.upper.points()[sides.upper.degree()];
        let lower_te = sides.lower.points()[sides.lower.degree()];
        let mid = 0.5 * (upper_te.y + lower_te.y);

        let moved = BezierSides {
            upper: sides.upper.with_point(sides.upper.degree(), Point2::new(upper_te.x, mid + 0.5 * gap)),
            lower: sides.lower.with_point(sides.lower.degree(), Point2::new(lower_te.x, mid - 0.5 * gap)),
        };
        let n = airfoil.upper().len();
        return Ok(Outcome::success(Airfoil::from_bezier(
            airfoil.name(),
            moved,
            n,
            airfoil.order(),
        )?));
    }

    edit_distributions(airfoil, params, |t, c| {
        let delta = gap - t.te_value();
        debug!(delta, blend, "trailing edge gap");
        let last = t.x().len() - 1;
        let y = izip!(t.x(), t.y())
            .enumerate()
            .map(|(i, (x, v))| {
                let factor = if blend == 0.0 {
                    if i == last {
                        1.0
                    } else {
                        0.0
                    }
                } else {
                    (-((1.0 - x) * (1.0 / blend - 1.0)).min(MAX_EXPONENT)).exp()
                };
                v + delta * x * factor
            })
            .collect();
        Ok((t.with_values(y)?, c.clone()))
    })
}

/// Scales the leading edge radius by `factor`. The thickness is multiplied by a factor which is
/// sqrt(factor) at the leading edge and approaches 1 downstream, the faster the smaller `blend`.
pub fn set_le_radius(airfoil: &Airfoil, factor: f64, blend: f64, params: &GeometryParams) -> Result<Outcome<Airfoil>> {
    if !(factor > 0.0 && factor.is_finite()) {
        return Err(GeometryError::InvalidParameter { name: "le_radius_factor", value: factor });
    }
    check_blend(blend)?;

    edit_distributions(airfoil, params, |t, c| {
        let root = factor.abs().sqrt();
        let y = izip!(t.x(), t.y())
            .map(|(x, v)| {
                let decay = (x / blend).min(MAX_EXPONENT);
                v * (1.0 - (1.0 - root) * (-decay).exp())
            })
            .collect();
        Ok((t.with_values(y)?, c.clone()))
    })
}

/// Blends two airfoils surface by surface. A factor of 0 yields `a`, 1 yields `b`. The result
/// is sampled at a cosine distribution with as many stations as `a` has upper surface points.
pub fn blend(a: &Airfoil, b: &Airfoil, factor: f64, params: &GeometryParams) -> Result<Outcome<Airfoil>> {
    if !(0.0..=1.0).contains(&factor) {
        return Err(GeometryError::InvalidParameter { name: "blend_factor", value: factor });
    }

    let mut sampled = params.clone();
    sampled.decompose.stations = Stations::Cosine(a.upper().len().max(3));

    let da = decompose(a, &sampled)?;
    let db = decompose(b, &sampled)?;
    let mix = |p: &Distribution, q: &Distribution| -> Result<Distribution> {
        p.with_values(izip!(p.y(), q.y()).map(|(u, v)| (1.0 - factor) * u + factor * v).collect())
    };

    let thickness = mix(&da.value.thickness, &db.value.thickness)?;
    let camber = mix(&da.value.camber, &db.value.camber)?;
    let rebuilt = reconstruct(a.name(), &thickness, &camber, da.value.order, &params.decompose)?;
    let normalized = normalize(&rebuilt, params)?;

    Ok(Outcome::with_status(
        normalized.value,
        da.status.and(db.status).and(normalized.status),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airfoil::generate::{AirfoilGenerator, Naca4Digit};
    use crate::geometry::bezier::Bezier2;
    use approx::assert_relative_eq;
    use test_case::test_case;

    fn naca(designation: &str) -> Airfoil {
        Naca4Digit::from_designation(designation).unwrap().airfoil(81).unwrap()
    }

    #[test_case(0.0, 0.8)]
    #[test_case(0.01, 0.8)]
    #[test_case(0.005, 0.3)]
    #[test_case(0.02, 1.0)]
    fn te_gap_is_set(gap: f64, blend: f64) {
        let params = GeometryParams::default();
        let af = set_te_gap(&naca("0012"), gap, blend, &params).unwrap().value;
        assert_relative_eq!(gap, af.te_gap(), epsilon = 1e-6);
    }

    #[test]
    fn te_gap_leaves_nose_alone() {
        let params = GeometryParams::default();
        let before = naca("2412");
        let after = set_te_gap(&before, 0.02, 0.3, &params).unwrap().value;
        let (x0, t0) = decompose(&before, &params).unwrap().value.thickness.high_point();
        let (x1, t1) = decompose(&after, &params).unwrap().value.thickness.high_point();
        assert_relative_eq!(x0, x1, epsilon = 0.02);
        assert_relative_eq!(t0, t1, epsilon = 2e-3);
    }

    #[test]
    fn invalid_gap_parameters() {
        let params = GeometryParams::default();
        let af = naca("0012");
        assert!(set_te_gap(&af, -0.01, 0.8, &params).is_err());
        assert!(set_te_gap(&af, 0.01, -0.1, &params).is_err());
        assert!(set_te_gap(&af, 0.01, 1.5, &params).is_err());
        assert!(set_le_radius(&af, 2.0, 0.0, &params).is_err());
    }

    #[test]
    fn zero_blend_moves_trailing_edge_only() {
        let params = GeometryParams::default();
        let before = naca("2412");
        let after = set_te_gap(&before, 0.01, 0.0, &params).unwrap().value;
        assert_relative_eq!(0.01, after.te_gap(), epsilon = 1e-6);

        let t0 = decompose(&before, &params).unwrap().value.thickness;
        let t1 = decompose(&after, &params).unwrap().value.thickness;
        assert_eq!(t0.x().len(), t1.x().len());
        for (_, a, b) in izip!(t0.x(), t0.y(), t1.y()).filter(|(x, _, _)| **x < 0.5) {
            assert_relative_eq!(*a, *b, epsilon = 1e-5);
        }
    }

    #[test_case(2.0)]
    #[test_case(0.5)]
    fn le_radius_is_scaled(factor: f64) {
        let params = GeometryParams::default();
        let af = naca("0012");
        let before = af.le_radius(&params.le_search).unwrap().value;
        let edited = set_le_radius(&af, factor, 0.1, &params).unwrap().value;
        let after = edited.le_radius(&params.le_search).unwrap().value;
        assert_relative_eq!(factor, after / before, epsilon = 0.1 * factor);
    }

    #[test]
    fn max_thickness_is_set() {
        let params = GeometryParams::default();
        let af = set_max_thickness(&naca("2412"), 0.09, &params).unwrap().value;
        let p = af.properties(&params).unwrap().value;
        assert_relative_eq!(0.09, p.max_thickness, epsilon = 5e-4);
    }

    #[test]
    fn max_camber_is_set() {
        let params = GeometryParams::default();
        let af = set_max_camber(&naca("2412"), 0.035, &params).unwrap().value;
        let p = af.properties(&params).unwrap().value;
        assert_relative_eq!(0.035, p.max_camber, epsilon = 5e-4);
    }

    #[test]
    fn camber_high_point_is_moved() {
        let params = GeometryParams::default();
        let af = set_high_point(&naca("2412"), DistributionKind::Camber, 0.3, &params).unwrap().value;
        let p = af.properties(&params).unwrap().value;
        assert_relative_eq!(0.3, p.max_camber_x, epsilon = 0.01);
    }

    #[test]
    fn order_survives_edit() {
        let params = GeometryParams::default();
        let af = naca("2412").to_order(crate::airfoil::SurfaceOrder::UpperFirst);
        let edited = set_max_thickness(&af, 0.1, &params).unwrap().value;
        assert_eq!(crate::airfoil::SurfaceOrder::UpperFirst, edited.order());
    }

    #[test]
    fn blend_halfway() {
        let params = GeometryParams::default();
        let b = blend(&naca("0008"), &naca("0016"), 0.5, &params).unwrap().value;
        let p = b.properties(&params).unwrap().value;
        assert_relative_eq!(0.12, p.max_thickness, epsilon = 1e-3);
        assert!(blend(&naca("0008"), &naca("0016"), 1.5, &params).is_err());
    }

    #[test]
    fn bezier_te_gap_moves_end_points() {
        let upper = Bezier2::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.03),
            Point2::new(0.3, 0.08),
            Point2::new(1.0, 0.0),
        ])
        .unwrap();
        let sides = BezierSides {
            lower: upper.mirrored(),
            upper,
        };
        let af = Airfoil::from_bezier("bez", sides, 40, Default::default()).unwrap();
        let edited = set_te_gap(&af, 0.01, 0.8, &GeometryParams::default()).unwrap().value;

        let moved = edited.bezier().unwrap();
        assert_relative_eq!(0.005, moved.upper.points()[3].y);
        assert_relative_eq!(-0.005, moved.lower.points()[3].y);
        assert_relative_eq!(0.01, edited.te_gap(), epsilon = 1e-12);
    }
}

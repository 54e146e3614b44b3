use airfoil_geometry_rs::airfoil::bezier_match::{fit_side, FitTarget};
use airfoil_geometry_rs::airfoil::decompose::{decompose, DistributionKind};
use airfoil_geometry_rs::airfoil::edit::set_te_gap;
use airfoil_geometry_rs::airfoil::generate::{AirfoilGenerator, Naca4Digit};
use airfoil_geometry_rs::airfoil::highpoint::remap_high_point;
use airfoil_geometry_rs::airfoil::normalize::{is_normalized, normalize};
use airfoil_geometry_rs::geometry::bezier::Bezier2;
use airfoil_geometry_rs::geometry::curve2::Curve2;
use airfoil_geometry_rs::io::{parse_dat, write_dat};
use airfoil_geometry_rs::ops::Operation;
use airfoil_geometry_rs::session::Session;
use airfoil_geometry_rs::{Airfoil, GeometryError, GeometryParams, Side, SurfaceOrder};
use approx::assert_relative_eq;
use ncollide2d::na::{Isometry2, Point2, Vector2};
use std::f64::consts::PI;

/// Symmetric four digit section with the given thickness, written TE, upper, LE, lower, TE
fn symmetric_section(t: f64, n: usize) -> Airfoil {
    let half = |x: f64| {
        5.0 * t * (0.2969 * x.sqrt() - 0.1260 * x - 0.3516 * x.powi(2) + 0.2843 * x.powi(3) - 0.1015 * x.powi(4))
    };
    let x: Vec<f64> = (0..n).map(|i| 0.5 * (1.0 - (PI * i as f64 / (n - 1) as f64).cos())).collect();
    let upper: Vec<Point2<f64>> = x.iter().map(|x| Point2::new(*x, half(*x))).collect();
    let lower: Vec<Point2<f64>> = x.iter().map(|x| Point2::new(*x, -half(*x))).collect();
    Airfoil::from_sides("symmetric", &upper, &lower, SurfaceOrder::UpperFirst).unwrap()
}

fn displaced(af: &Airfoil) -> Airfoil {
    let iso = Isometry2::new(Vector2::new(0.25, 0.1), -0.05);
    let points = af.points().iter().map(|p| iso * Point2::from(p.coords * 0.8)).collect();
    Airfoil::new(af.name(), points).unwrap()
}

#[test]
fn normalization_is_idempotent() {
    let params = GeometryParams::default();
    let once = normalize(&displaced(&symmetric_section(0.1, 81)), &params).unwrap().value;
    assert!(is_normalized(&once, &params));

    let twice = normalize(&once, &params).unwrap().value;
    assert_eq!(once, twice);
    assert_eq!(SurfaceOrder::UpperFirst, twice.order());
}

#[test]
fn thickness_of_known_section_is_recovered() {
    let params = GeometryParams::default();
    let d = decompose(&symmetric_section(0.08, 121), &params).unwrap().value;
    let (x, t) = d.thickness.high_point();

    assert_relative_eq!(0.08, t, epsilon = 1e-3);
    assert_relative_eq!(0.3, x, epsilon = 5e-3);
    assert!(d.camber.is_flat());
}

#[test]
fn decomposition_round_trip() {
    let params = GeometryParams::default();
    let af = normalize(&symmetric_section(0.12, 81), &params).unwrap().value;
    let d = decompose(&af, &params).unwrap().value;
    let rebuilt = d.reconstruct(af.name(), &params.decompose).unwrap();

    assert_eq!(af.order(), rebuilt.order());
    for (a, b) in af.upper().iter().zip(rebuilt.upper()) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-9);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-6);
    }
}

#[test]
fn high_point_remap_keeps_end_values() {
    let params = GeometryParams::default();
    let d = decompose(&symmetric_section(0.1, 121), &params).unwrap().value;
    let moved = remap_high_point(&d.thickness, 0.4).unwrap();

    assert_eq!(DistributionKind::Thickness, moved.kind());
    assert_relative_eq!(0.4, moved.high_point().0, epsilon = 5e-3);
    assert_eq!(d.thickness.le_value(), moved.le_value());
    assert_eq!(d.thickness.te_value(), moved.te_value());
}

#[test]
fn bezier_fit_matches_known_curve() {
    let known = Bezier2::new(vec![
        Point2::new(0.0, 0.0),
        Point2::new(0.0, 0.035),
        Point2::new(0.3, 0.08),
        Point2::new(0.7, 0.04),
        Point2::new(1.0, 0.0),
    ])
    .unwrap();
    let u: Vec<f64> = (0..=150).map(|i| i as f64 / 150.0).collect();
    let target = FitTarget::new(
        Side::Upper,
        &known.sample(&u),
        known.curvature_at(0.0),
        known.curvature_at(1.0),
    )
    .unwrap();

    let mut params = GeometryParams::default();
    params.bezier_fit.control_points = 5;
    let fit = fit_side(&target, &params).unwrap();

    assert!(fit.status.is_success());
    assert!(fit.value.evaluations <= 2000);
    assert_relative_eq!(
        known.curvature_at(0.0).abs(),
        fit.value.le_curvature.abs(),
        max_relative = 0.05
    );
}

#[test]
fn bezier_fit_of_semicircle() {
    // Radius 0.5 from (0, 0) over the top to (1, 0), curvature -2 running clockwise
    let arc: Vec<Point2<f64>> = (0..=200)
        .map(|i| {
            let a = PI * i as f64 / 200.0;
            Point2::new(0.5 - 0.5 * a.cos(), 0.5 * a.sin())
        })
        .collect();
    let target = FitTarget::new(Side::Upper, &arc, -2.0, -2.0).unwrap();

    let mut params = GeometryParams::default();
    params.bezier_fit.control_points = 5;
    let fit = fit_side(&target, &params).unwrap();

    assert!(fit.status.is_success());
    assert!(fit.value.evaluations <= 2000);
    assert_relative_eq!(2.0, fit.value.le_curvature.abs(), max_relative = 0.05);
}

#[test]
fn two_points_are_an_input_error() {
    let r = Airfoil::new("short", vec![Point2::new(1.0, 0.0), Point2::new(0.0, 0.0)]);
    assert!(matches!(r, Err(GeometryError::NotEnoughPoints { .. })));
}

#[test]
fn te_gap_sets_endpoint_separation() {
    let params = GeometryParams::default();
    let af = set_te_gap(&symmetric_section(0.12, 81), 0.012, 0.8, &params).unwrap().value;
    let pts = af.points();
    let gap = (pts[0] - pts[pts.len() - 1]).norm();
    assert_relative_eq!(0.012, gap, epsilon = 1e-6);
}

#[test]
fn session_through_dat_text() {
    let naca = Naca4Digit::from_designation("2412").unwrap().airfoil(61).unwrap();
    let af = parse_dat(&write_dat("NACA 2412", &naca)).unwrap();
    let mut session = Session::new(af, GeometryParams::default()).unwrap();

    session.apply(Operation::SetMaxCamber { value: 0.03 }).unwrap();
    session
        .apply(Operation::SetHighPoint {
            kind: DistributionKind::Camber,
            x: 0.35,
        })
        .unwrap();
    assert!(session.apply(Operation::SetTeGap { gap: -1.0, blend: 0.5 }).is_err());

    let p = session.current().airfoil.properties(session.params()).unwrap().value;
    assert_eq!(3, session.designs().len());
    assert_relative_eq!(0.12, p.max_thickness, epsilon = 2e-3);
    assert_relative_eq!(0.35, p.max_camber_x, epsilon = 0.01);
}

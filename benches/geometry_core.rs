use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ncollide2d::na::{Isometry2, Point2, Vector2};

use airfoil_geometry_rs::airfoil::bezier_match::match_bezier;
use airfoil_geometry_rs::airfoil::decompose::decompose;
use airfoil_geometry_rs::airfoil::generate::{AirfoilGenerator, Naca4Digit};
use airfoil_geometry_rs::airfoil::normalize::normalize;
use airfoil_geometry_rs::{Airfoil, GeometryParams};

fn displaced(af: &Airfoil) -> Airfoil {
    let iso = Isometry2::new(Vector2::new(0.1, -0.05), 0.03);
    let points = af.points().iter().map(|p| iso * Point2::from(p.coords * 1.3)).collect();
    Airfoil::new(af.name(), points).unwrap()
}

fn benchmark(c: &mut Criterion) {
    let params = GeometryParams::default();
    let naca = Naca4Digit::new(0.12, 1.0, 0.02, 0.4).airfoil(101).unwrap();
    let moved = displaced(&naca);

    c.bench_function("Spline Fit", |b| b.iter(|| black_box(&naca).spline().unwrap()));
    c.bench_function("Normalize", |b| b.iter(|| normalize(black_box(&moved), &params).unwrap()));
    c.bench_function("Decompose", |b| b.iter(|| decompose(black_box(&naca), &params).unwrap()));

    let mut group = c.benchmark_group("Bezier");
    group.sample_size(10);
    group.bench_function("Match Bezier", |b| b.iter(|| match_bezier(black_box(&naca), &params).unwrap()));
    group.finish();
}

criterion_group!(benches, benchmark);
criterion_main!(benches);

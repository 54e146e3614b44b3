use ncollide2d::na::{Point2, RealField, Vector2};

/// Return the distance between two 2D points
pub fn dist<N: RealField + Copy>(a: &Point2<N>, b: &Point2<N>) -> N {
    (a - b).norm()
}

pub fn mid_point(a: &Point2<f64>, b: &Point2<f64>) -> Point2<f64> {
    Point2::from((a.coords + b.coords) * 0.5)
}

/// The angle which rotates `v1` onto `v2`, positive counterclockwise
pub fn signed_angle<N: RealField + Copy>(v1: &Vector2<N>, v2: &Vector2<N>) -> N {
    (v1.x * v2.y - v1.y * v2.x).atan2(v1.x * v2.x + v1.y * v2.y)
}

/// Twice the signed area enclosed by a polygon, positive when it runs counterclockwise. The
/// polygon is implicitly closed between its last and first point.
pub fn signed_area2(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let a = &points[i];
            let b = &points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum()
}

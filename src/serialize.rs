/// Serializes a list of points as a sequence of `[x, y]` pairs
pub mod points {
    use ncollide2d::na::Point2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(points: &[Point2<f64>], serializer: S) -> Result<S::Ok, S::Error> {
        let pairs: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        pairs.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Point2<f64>>, D::Error> {
        let pairs = Vec::<[f64; 2]>::deserialize(deserializer)?;
        Ok(pairs.into_iter().map(|[x, y]| Point2::new(x, y)).collect())
    }
}

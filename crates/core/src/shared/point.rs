use serde::{Deserialize, Serialize};

/// A landmark coordinate as produced by the face-mesh model.
///
/// Sources that only report 2D positions leave `z` at 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "PointRepr")]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn planar(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Euclidean distance in the image plane. Depth is ignored.
    pub fn planar_distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Accepted wire shapes: `[x, y]`, `[x, y, z]` or `{"x", "y", "z"?}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PointRepr {
    Planar([f64; 2]),
    Spatial([f64; 3]),
    Named {
        x: f64,
        y: f64,
        #[serde(default)]
        z: f64,
    },
}

impl From<PointRepr> for Point {
    fn from(repr: PointRepr) -> Self {
        match repr {
            PointRepr::Planar([x, y]) => Point::planar(x, y),
            PointRepr::Spatial([x, y, z]) => Point::new(x, y, z),
            PointRepr::Named { x, y, z } => Point::new(x, y, z),
        }
    }
}

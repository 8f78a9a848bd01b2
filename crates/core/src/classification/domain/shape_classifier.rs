//! Jaw-ratio face-shape classifier.
//!
//! Width is measured cheek to cheek, height forehead to chin. The ratio is
//! compared against fixed thresholds, widest first; every comparison is
//! strict, so a ratio sitting exactly on a threshold lands in the narrower
//! bucket.
//!
//! Degenerate geometry is not rejected. A zero jaw height with a non-zero
//! width gives an infinite ratio and classifies as [`FaceShape::Round`]; a
//! fully collapsed jaw (0/0) gives NaN, which fails every comparison and
//! classifies as [`FaceShape::Heart`].

use crate::classification::domain::face_shape::FaceShape;
use crate::landmarks::domain::face_mesh::FaceMesh;

/// Lower bounds (exclusive) on width / height, widest shape first.
const THRESHOLDS: [(f64, FaceShape); 4] = [
    (1.5, FaceShape::Round),
    (1.3, FaceShape::Oval),
    (1.1, FaceShape::Square),
    (0.9, FaceShape::Rectangle),
];

/// Shape for ratios at or below every threshold.
const FALLBACK: FaceShape = FaceShape::Heart;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JawMeasurements {
    pub width: f64,
    pub height: f64,
}

impl JawMeasurements {
    pub fn ratio(&self) -> f64 {
        self.width / self.height
    }
}

pub fn measure_jaw(mesh: &FaceMesh) -> JawMeasurements {
    JawMeasurements {
        width: mesh.jaw_left().planar_distance(&mesh.jaw_right()),
        height: mesh.jaw_bottom().planar_distance(&mesh.jaw_top()),
    }
}

pub fn classify_ratio(ratio: f64) -> FaceShape {
    THRESHOLDS
        .iter()
        .find(|(threshold, _)| ratio > *threshold)
        .map(|(_, shape)| *shape)
        .unwrap_or(FALLBACK)
}

pub fn classify(mesh: &FaceMesh) -> FaceShape {
    classify_ratio(measure_jaw(mesh).ratio())
}

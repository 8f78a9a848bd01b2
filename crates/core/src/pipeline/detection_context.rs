use serde::Serialize;

use crate::classification::domain::face_shape::FaceShape;
use crate::classification::domain::recommendation_table::Recommendation;

/// State of a detection run, owned by whoever drives the loop.
///
/// Holds what a display layer would show: the latest face shape and overlay.
/// A tick without a face leaves both untouched; each recommendation replaces
/// them outright.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DetectionContext {
    face_shape: Option<FaceShape>,
    overlay: Option<String>,
    last_frame: Option<usize>,
    attempts: usize,
    detections: usize,
    failures: usize,
}

impl DetectionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn face_shape(&self) -> Option<FaceShape> {
        self.face_shape
    }

    pub fn overlay(&self) -> Option<&str> {
        self.overlay.as_deref()
    }

    /// Frame index the current label was derived from.
    pub fn last_frame(&self) -> Option<usize> {
        self.last_frame
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn detections(&self) -> usize {
        self.detections
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn record_attempt(&mut self) {
        self.attempts += 1;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn apply(&mut self, recommendation: &Recommendation) {
        self.face_shape = Some(recommendation.face_shape);
        self.overlay = recommendation.overlay.clone();
        self.last_frame = Some(recommendation.frame_index);
        self.detections += 1;
    }
}

use crate::classification::domain::recommendation_table::{Recommendation, RecommendationTable};
use crate::classification::domain::shape_classifier::{classify_ratio, measure_jaw};
use crate::landmarks::domain::landmark_source::LandmarkSource;
use crate::shared::frame::Frame;

/// One detection attempt: estimate → classify first face → look up overlay.
pub struct RecommendFaceShapeUseCase {
    landmarks: Box<dyn LandmarkSource>,
    table: RecommendationTable,
}

impl RecommendFaceShapeUseCase {
    pub fn new(landmarks: Box<dyn LandmarkSource>, table: RecommendationTable) -> Self {
        Self { landmarks, table }
    }

    pub fn table(&self) -> &RecommendationTable {
        &self.table
    }

    /// Returns `Ok(None)` when the frame has no face. When several faces are
    /// found only the first one is classified. Landmark source errors are
    /// returned unchanged.
    pub fn execute(
        &mut self,
        frame: &Frame,
    ) -> Result<Option<Recommendation>, Box<dyn std::error::Error>> {
        let meshes = self.landmarks.estimate(frame)?;
        let Some(mesh) = meshes.first() else {
            return Ok(None);
        };

        let jaw = measure_jaw(mesh);
        let shape = classify_ratio(jaw.ratio());
        log::debug!(
            "Frame {}: {} face(s), jaw {:.1}x{:.1} (ratio {:.3}) -> {shape}",
            frame.index(),
            meshes.len(),
            jaw.width,
            jaw.height,
            jaw.ratio()
        );

        Ok(Some(self.table.recommendation(shape, frame.index())))
    }
}

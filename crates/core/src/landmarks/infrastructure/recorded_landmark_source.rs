use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::landmarks::domain::face_mesh::FaceMesh;
use crate::landmarks::domain::landmark_source::LandmarkSource;
use crate::landmarks::infrastructure::landmark_recording::{LandmarkRecording, RecordingError};
use crate::shared::frame::Frame;

/// Replays previously captured model output by frame index.
///
/// Stands in for the live face-mesh model when running offline: frames
/// missing from the recording yield no faces.
pub struct RecordedLandmarkSource {
    cache: Arc<HashMap<usize, Vec<FaceMesh>>>,
}

impl RecordedLandmarkSource {
    pub fn new(cache: Arc<HashMap<usize, Vec<FaceMesh>>>) -> Self {
        Self { cache }
    }

    pub fn from_file(path: &Path) -> Result<Self, RecordingError> {
        let cache = LandmarkRecording::load(path)?.into_cache()?;
        log::debug!(
            "Loaded landmark recording with {} frames from {}",
            cache.len(),
            path.display()
        );
        Ok(Self::new(Arc::new(cache)))
    }

    pub fn recorded_frames(&self) -> usize {
        self.cache.len()
    }
}

impl LandmarkSource for RecordedLandmarkSource {
    fn estimate(&mut self, frame: &Frame) -> Result<Vec<FaceMesh>, Box<dyn std::error::Error>> {
        Ok(self.cache.get(&frame.index()).cloned().unwrap_or_default())
    }
}

use crate::landmarks::domain::face_mesh::FaceMesh;
use crate::shared::frame::Frame;

/// Domain interface for the external face-mesh model.
///
/// Returns one mesh per detected face, in the model's own order; an empty
/// vector means no face was found. Implementations may keep state between
/// frames, hence `&mut self`.
pub trait LandmarkSource: Send {
    fn estimate(&mut self, frame: &Frame) -> Result<Vec<FaceMesh>, Box<dyn std::error::Error>>;
}

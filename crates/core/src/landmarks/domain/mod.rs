pub mod face_mesh;
pub mod landmark_source;

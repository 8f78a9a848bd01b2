//! Face-shape classification and hairstyle recommendation from face-mesh
//! landmarks.
//!
//! Landmark detection is an external collaborator behind
//! [`landmarks::domain::landmark_source::LandmarkSource`]; this crate turns
//! its meshes into a [`classification::domain::face_shape::FaceShape`] and an
//! overlay image path, and runs that periodically over a frame source.

pub mod classification;
pub mod landmarks;
pub mod pipeline;
pub mod shared;
pub mod video;

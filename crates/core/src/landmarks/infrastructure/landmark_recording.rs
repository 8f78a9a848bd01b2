//! JSON file formats for captured landmark output.
//!
//! A recording lists, per frame index, every mesh the model produced for
//! that frame:
//!
//! ```json
//! { "frames": [ { "index": 0, "faces": [ [[x, y, z], ...] ] } ] }
//! ```
//!
//! A single mesh file is just the point array.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::landmarks::domain::face_mesh::{FaceMesh, MeshError};
use crate::shared::point::Point;

#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed landmark file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("frame {frame}, face {face}: {source}")]
    Mesh {
        frame: usize,
        face: usize,
        source: MeshError,
    },
    #[error("frame {0} is recorded more than once")]
    DuplicateFrame(usize),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkRecording {
    pub frames: Vec<RecordedFrame>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub index: usize,
    #[serde(default)]
    pub faces: Vec<Vec<Point>>,
}

impl LandmarkRecording {
    pub fn load(path: &Path) -> Result<Self, RecordingError> {
        read_json(path)
    }

    /// Validates every mesh and indexes them by frame.
    pub fn into_cache(self) -> Result<HashMap<usize, Vec<FaceMesh>>, RecordingError> {
        let mut cache = HashMap::with_capacity(self.frames.len());
        for recorded in self.frames {
            let frame = recorded.index;
            let meshes = recorded
                .faces
                .into_iter()
                .enumerate()
                .map(|(face, points)| {
                    FaceMesh::new(points).map_err(|source| RecordingError::Mesh {
                        frame,
                        face,
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            if cache.insert(frame, meshes).is_some() {
                return Err(RecordingError::DuplicateFrame(frame));
            }
        }
        Ok(cache)
    }
}

/// Loads a single mesh stored as a bare point array.
pub fn load_mesh(path: &Path) -> Result<FaceMesh, RecordingError> {
    let points: Vec<Point> = read_json(path)?;
    FaceMesh::new(points).map_err(|source| RecordingError::Mesh {
        frame: 0,
        face: 0,
        source,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, RecordingError> {
    let text = fs::read_to_string(path).map_err(|source| RecordingError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| RecordingError::Json {
        path: path.to_path_buf(),
        source,
    })
}

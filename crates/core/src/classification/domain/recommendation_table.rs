use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::classification::domain::face_shape::FaceShape;

const DEFAULT_ENTRIES: [(FaceShape, &str); 5] = [
    (FaceShape::Round, "hairstyles/round_face_style.png"),
    (FaceShape::Oval, "hairstyles/oval_face_style.png"),
    (FaceShape::Square, "hairstyles/square_face_style.png"),
    (FaceShape::Rectangle, "hairstyles/rectangle_face_style.png"),
    (FaceShape::Heart, "hairstyles/heart_face_style.png"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("no hairstyle configured for {0} faces")]
    Missing(FaceShape),
    #[error("hairstyle path for {0} faces is empty")]
    EmptyPath(FaceShape),
}

/// The outcome of one successful detection tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recommendation {
    pub frame_index: usize,
    pub face_shape: FaceShape,
    /// Overlay image to show; `None` clears the overlay.
    pub overlay: Option<String>,
}

/// Maps each face shape to the hairstyle overlay image shown for it.
///
/// Built once at startup and read-only afterwards. Construction guarantees
/// a non-empty path for every shape.
#[derive(Clone, Debug, PartialEq)]
pub struct RecommendationTable {
    entries: HashMap<FaceShape, String>,
}

impl RecommendationTable {
    /// Builds a table from explicit entries, requiring a non-empty path for
    /// every shape.
    pub fn from_entries(entries: HashMap<FaceShape, String>) -> Result<Self, TableError> {
        for shape in FaceShape::ALL {
            match entries.get(&shape) {
                None => return Err(TableError::Missing(shape)),
                Some(path) if path.trim().is_empty() => return Err(TableError::EmptyPath(shape)),
                Some(_) => {}
            }
        }
        Ok(Self { entries })
    }

    /// Default table with individual entries replaced.
    pub fn with_overrides(overrides: &HashMap<FaceShape, String>) -> Result<Self, TableError> {
        let mut entries = Self::default().entries;
        for (shape, path) in overrides {
            entries.insert(*shape, path.clone());
        }
        Self::from_entries(entries)
    }

    pub fn recommend(&self, shape: FaceShape) -> Option<&str> {
        self.entries.get(&shape).map(String::as_str)
    }

    pub fn recommendation(&self, shape: FaceShape, frame_index: usize) -> Recommendation {
        Recommendation {
            frame_index,
            face_shape: shape,
            overlay: self.recommend(shape).map(str::to_owned),
        }
    }

    /// Entries in [`FaceShape::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (FaceShape, &str)> + '_ {
        FaceShape::ALL
            .into_iter()
            .filter_map(|shape| self.recommend(shape).map(|path| (shape, path)))
    }
}

impl Default for RecommendationTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_ENTRIES
                .iter()
                .map(|(shape, path)| (*shape, (*path).to_string()))
                .collect(),
        }
    }
}

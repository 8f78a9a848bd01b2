//! Face-mesh landmarks with named access to the jawline points.
//!
//! The external model emits a fixed topology: every index always refers to
//! the same facial feature, across frames and across faces. Only four of
//! those indices are used here, and this is the one place they are spelled
//! out.

use thiserror::Error;

use crate::shared::constants::{
    JAW_BOTTOM_INDEX, JAW_LEFT_INDEX, JAW_RIGHT_INDEX, JAW_TOP_INDEX, MESH_POINT_COUNT,
    REFINED_MESH_POINT_COUNT,
};
use crate::shared::point::Point;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("face mesh must have 468 or 478 points, got {0}")]
    PointCount(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FaceMesh {
    points: Vec<Point>,
}

impl FaceMesh {
    pub fn new(points: Vec<Point>) -> Result<Self, MeshError> {
        match points.len() {
            MESH_POINT_COUNT | REFINED_MESH_POINT_COUNT => Ok(Self { points }),
            n => Err(MeshError::PointCount(n)),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when the mesh carries the extra iris points.
    pub fn is_refined(&self) -> bool {
        self.points.len() == REFINED_MESH_POINT_COUNT
    }

    /// Top of the forehead on the face midline.
    pub fn jaw_top(&self) -> Point {
        self.points[JAW_TOP_INDEX]
    }

    /// Chin tip on the face midline.
    pub fn jaw_bottom(&self) -> Point {
        self.points[JAW_BOTTOM_INDEX]
    }

    /// Outermost point on the subject's right cheek (image left).
    pub fn jaw_left(&self) -> Point {
        self.points[JAW_LEFT_INDEX]
    }

    /// Outermost point on the subject's left cheek (image right).
    pub fn jaw_right(&self) -> Point {
        self.points[JAW_RIGHT_INDEX]
    }
}

impl TryFrom<Vec<Point>> for FaceMesh {
    type Error = MeshError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

/// Builds a base-topology mesh whose jaw points sit at the given positions;
/// every other point is at the origin.
#[cfg(test)]
pub(crate) fn mesh_with_jaw(top: Point, bottom: Point, left: Point, right: Point) -> FaceMesh {
    let mut points = vec![Point::default(); MESH_POINT_COUNT];
    points[JAW_TOP_INDEX] = top;
    points[JAW_BOTTOM_INDEX] = bottom;
    points[JAW_LEFT_INDEX] = left;
    points[JAW_RIGHT_INDEX] = right;
    FaceMesh::new(points).expect("base mesh length")
}

/// Mesh with the given jaw width (horizontal) and height (vertical).
#[cfg(test)]
pub(crate) fn mesh_with_jaw_size(width: f64, height: f64) -> FaceMesh {
    mesh_with_jaw(
        Point::planar(0.0, 0.0),
        Point::planar(0.0, height),
        Point::planar(0.0, 0.0),
        Point::planar(width, 0.0),
    )
}

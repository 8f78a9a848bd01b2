use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Coarse face-shape label derived from jaw proportions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FaceShape {
    Round,
    Oval,
    Square,
    Rectangle,
    Heart,
}

impl FaceShape {
    /// Every label, widest jaw ratio first.
    pub const ALL: [FaceShape; 5] = [
        FaceShape::Round,
        FaceShape::Oval,
        FaceShape::Square,
        FaceShape::Rectangle,
        FaceShape::Heart,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FaceShape::Round => "Round",
            FaceShape::Oval => "Oval",
            FaceShape::Square => "Square",
            FaceShape::Rectangle => "Rectangle",
            FaceShape::Heart => "Heart",
        }
    }
}

impl fmt::Display for FaceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for FaceShape {
    type Err = String;

    /// Case-insensitive match on the label name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FaceShape::ALL
            .into_iter()
            .find(|shape| shape.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown face shape '{s}'"))
    }
}

use std::path::PathBuf;

/// Describes an opened frame source.
///
/// `total_frames` is `None` for sources without a known end (a live camera).
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub total_frames: Option<usize>,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

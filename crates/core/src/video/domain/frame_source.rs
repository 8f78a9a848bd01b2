use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Supplies frames to the detection loop (the camera, in a live setting).
///
/// The loop pulls one frame per tick through the iterator returned by
/// `frames`; a source yields nothing until it has been opened.
pub trait FrameSource: Send {
    /// Opens the source and returns its dimensions and frame count.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames in capture order.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the source.
    fn close(&mut self);
}

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::classification::domain::recommendation_table::Recommendation;
use crate::pipeline::detection_context::DetectionContext;
use crate::pipeline::detection_logger::DetectionLogger;
use crate::pipeline::recommend_face_shape_use_case::RecommendFaceShapeUseCase;
use crate::shared::constants::DEFAULT_TICK_INTERVAL_MS;
use crate::video::domain::frame_source::FrameSource;

/// Configuration for a detection loop run.
pub struct LoopConfig {
    /// Time between frame pulls.
    pub interval: Duration,
    /// Stop after this many ticks; `None` runs until the source ends.
    pub max_ticks: Option<usize>,
    /// Expected number of frames, for progress reporting only.
    pub total_frames: Option<usize>,
    /// Called on the caller's thread for every recommendation, in order.
    pub on_recommendation: Option<Box<dyn Fn(&Recommendation) + Send>>,
    pub cancelled: Arc<AtomicBool>,
}

impl LoopConfig {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_ticks: None,
            total_frames: None,
            on_recommendation: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_TICK_INTERVAL_MS))
    }
}

/// Drives periodic detection: pull a frame each tick, recommend, update the
/// context.
///
/// `frames` must already be opened. The context is handed in and handed back
/// so the caller owns all state between runs.
pub trait DetectionLoop: Send {
    fn run(
        &self,
        frames: Box<dyn FrameSource>,
        use_case: RecommendFaceShapeUseCase,
        context: DetectionContext,
        logger: &mut dyn DetectionLogger,
        config: LoopConfig,
    ) -> Result<DetectionContext, Box<dyn std::error::Error>>;
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::classification::domain::recommendation_table::Recommendation;
use crate::pipeline::detection_context::DetectionContext;
use crate::pipeline::detection_logger::DetectionLogger;
use crate::pipeline::detection_loop::{DetectionLoop, LoopConfig};
use crate::pipeline::recommend_face_shape_use_case::RecommendFaceShapeUseCase;
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::FrameSource;

type SendError = Box<dyn std::error::Error + Send + Sync>;

/// Result of one attempt, sent from the detector thread to the caller.
enum Outcome {
    Estimated {
        frame_index: usize,
        result: Result<Option<Recommendation>, String>,
        duration_ms: f64,
        pending: usize,
    },
    SourceFailed(SendError),
}

/// Runs the detection loop on two worker threads.
///
/// Layout: `ticker [frame pull] → detector [estimate/classify] → caller [context]`
///
/// The ticker never waits for the detector: every tick pulls a frame and
/// queues it on an unbounded channel. When estimation is slower than the
/// interval, attempts pile up and are worked off in order; the queue depth
/// is reported as the `pending_attempts` metric.
///
/// Landmark failures are logged and count as a tick with no face. A frame
/// source failure ends the run with that error.
pub struct ThreadedDetectionLoop;

impl ThreadedDetectionLoop {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ThreadedDetectionLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionLoop for ThreadedDetectionLoop {
    fn run(
        &self,
        frames: Box<dyn FrameSource>,
        use_case: RecommendFaceShapeUseCase,
        mut context: DetectionContext,
        logger: &mut dyn DetectionLogger,
        config: LoopConfig,
    ) -> Result<DetectionContext, Box<dyn std::error::Error>> {
        let (attempt_tx, attempt_rx) = crossbeam_channel::unbounded::<Result<Frame, SendError>>();
        let (outcome_tx, outcome_rx) = crossbeam_channel::unbounded::<Outcome>();

        logger.info(&format!(
            "Detecting every {}ms",
            config.interval.as_millis()
        ));

        let ticker_handle = spawn_ticker(
            frames,
            attempt_tx,
            config.interval,
            config.max_ticks,
            config.cancelled.clone(),
        );
        let detector_handle =
            spawn_detector(use_case, attempt_rx, outcome_tx, config.cancelled.clone());

        let main_error = run_main_loop(outcome_rx, &mut context, logger, &config);

        join_threads(ticker_handle, detector_handle, main_error)?;
        logger.summary();
        Ok(context)
    }
}

fn spawn_ticker(
    mut source: Box<dyn FrameSource>,
    attempt_tx: crossbeam_channel::Sender<Result<Frame, SendError>>,
    interval: Duration,
    max_ticks: Option<usize>,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<Box<dyn FrameSource>> {
    std::thread::spawn(move || {
        {
            let ticker = crossbeam_channel::tick(interval);
            let mut frames = source.frames();
            let mut ticks = 0usize;
            loop {
                if max_ticks.is_some_and(|max| ticks >= max) {
                    break;
                }
                if ticker.recv().is_err() || cancelled.load(Ordering::Relaxed) {
                    break;
                }
                ticks += 1;

                let Some(frame_result) = frames.next() else {
                    break;
                };
                let failed = frame_result.is_err();
                let mapped = frame_result.map_err(|e| -> SendError { e.to_string().into() });
                if attempt_tx.send(mapped).is_err() || failed {
                    break;
                }
            }
        }
        source
    })
}

fn spawn_detector(
    mut use_case: RecommendFaceShapeUseCase,
    attempt_rx: crossbeam_channel::Receiver<Result<Frame, SendError>>,
    outcome_tx: crossbeam_channel::Sender<Outcome>,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        while let Ok(attempt) = attempt_rx.recv() {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }

            let outcome = match attempt {
                Ok(frame) => {
                    let start = Instant::now();
                    let result = use_case.execute(&frame).map_err(|e| e.to_string());
                    Outcome::Estimated {
                        frame_index: frame.index(),
                        result,
                        duration_ms: start.elapsed().as_secs_f64() * 1000.0,
                        pending: attempt_rx.len(),
                    }
                }
                Err(e) => Outcome::SourceFailed(e),
            };

            if outcome_tx.send(outcome).is_err() {
                break;
            }
        }
    })
}

/// Applies outcomes to the context as they arrive. Returns the first frame
/// source error, if any.
fn run_main_loop(
    outcome_rx: crossbeam_channel::Receiver<Outcome>,
    context: &mut DetectionContext,
    logger: &mut dyn DetectionLogger,
    config: &LoopConfig,
) -> Option<Box<dyn std::error::Error>> {
    let mut first_error: Option<Box<dyn std::error::Error>> = None;

    for outcome in outcome_rx {
        match outcome {
            Outcome::Estimated {
                frame_index,
                result,
                duration_ms,
                pending,
            } => {
                context.record_attempt();
                logger.timing("estimate", duration_ms);
                logger.metric("pending_attempts", pending as f64);

                match result {
                    Ok(Some(recommendation)) => {
                        context.apply(&recommendation);
                        if let Some(ref callback) = config.on_recommendation {
                            callback(&recommendation);
                        }
                    }
                    Ok(None) => log::trace!("Frame {frame_index}: no face"),
                    Err(e) => {
                        log::warn!("Landmark estimation failed on frame {frame_index}: {e}");
                        context.record_failure();
                    }
                }

                logger.progress(context.attempts(), config.total_frames);
            }
            Outcome::SourceFailed(e) => {
                if first_error.is_none() {
                    first_error = Some(e.to_string().into());
                }
            }
        }
    }

    first_error
}

/// Joins both worker threads and coalesces the first error encountered.
fn join_threads(
    ticker_handle: JoinHandle<Box<dyn FrameSource>>,
    detector_handle: JoinHandle<()>,
    mut first_error: Option<Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    fn set_if_none(slot: &mut Option<Box<dyn std::error::Error>>, err: Box<dyn std::error::Error>) {
        if slot.is_none() {
            *slot = Some(err);
        }
    }

    match ticker_handle.join() {
        Ok(mut source) => source.close(),
        Err(_) => set_if_none(&mut first_error, "Ticker thread panicked".into()),
    }

    if detector_handle.join().is_err() {
        set_if_none(&mut first_error, "Detector thread panicked".into());
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::domain::face_shape::FaceShape;
    use crate::classification::domain::recommendation_table::RecommendationTable;
    use crate::landmarks::domain::face_mesh::{mesh_with_jaw_size, FaceMesh};
    use crate::landmarks::domain::landmark_source::LandmarkSource;
    use crate::pipeline::detection_logger::{LogDetectionLogger, NullDetectionLogger};
    use crate::shared::video_metadata::VideoMetadata;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::Mutex;

    // --- Stubs ---

    /// Yields `count` blank frames, optionally failing at one index.
    struct StubFrames {
        count: usize,
        fail_at: Option<usize>,
    }

    impl StubFrames {
        fn new(count: usize) -> Self {
            Self {
                count,
                fail_at: None,
            }
        }
    }

    impl FrameSource for StubFrames {
        fn open(&mut self, _path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            Ok(VideoMetadata {
                width: 2,
                height: 2,
                total_frames: Some(self.count),
                source_path: None,
            })
        }

        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
            let fail_at = self.fail_at;
            Box::new((0..self.count).map(move |i| -> Result<Frame, Box<dyn std::error::Error>> {
                if Some(i) == fail_at {
                    Err("camera unplugged".into())
                } else {
                    Ok(Frame::new(vec![0u8; 12], 2, 2, 3, i))
                }
            }))
        }

        fn close(&mut self) {}
    }

    /// Never-ending frame source.
    struct EndlessFrames;

    impl FrameSource for EndlessFrames {
        fn open(&mut self, _path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            Ok(VideoMetadata {
                width: 2,
                height: 2,
                total_frames: None,
                source_path: None,
            })
        }

        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
            Box::new((0..).map(|i| -> Result<Frame, Box<dyn std::error::Error>> {
                Ok(Frame::new(vec![0u8; 12], 2, 2, 3, i))
            }))
        }

        fn close(&mut self) {}
    }

    /// Per-frame meshes; frames listed in `failing` return an error.
    struct ScriptedLandmarks {
        meshes: HashMap<usize, Vec<FaceMesh>>,
        failing: Vec<usize>,
        delay: Duration,
    }

    impl ScriptedLandmarks {
        fn new(meshes: HashMap<usize, Vec<FaceMesh>>) -> Self {
            Self {
                meshes,
                failing: Vec::new(),
                delay: Duration::ZERO,
            }
        }
    }

    impl LandmarkSource for ScriptedLandmarks {
        fn estimate(
            &mut self,
            frame: &Frame,
        ) -> Result<Vec<FaceMesh>, Box<dyn std::error::Error>> {
            std::thread::sleep(self.delay);
            if self.failing.contains(&frame.index()) {
                return Err("inference backend lost".into());
            }
            Ok(self.meshes.get(&frame.index()).cloned().unwrap_or_default())
        }
    }

    fn use_case(landmarks: ScriptedLandmarks) -> RecommendFaceShapeUseCase {
        RecommendFaceShapeUseCase::new(Box::new(landmarks), RecommendationTable::default())
    }

    fn fast_config() -> LoopConfig {
        LoopConfig::new(Duration::from_millis(1))
    }

    fn run(
        frames: Box<dyn FrameSource>,
        landmarks: ScriptedLandmarks,
        config: LoopConfig,
    ) -> Result<DetectionContext, Box<dyn std::error::Error>> {
        ThreadedDetectionLoop::new().run(
            frames,
            use_case(landmarks),
            DetectionContext::new(),
            &mut NullDetectionLogger,
            config,
        )
    }

    // --- Tests ---

    #[test]
    fn test_every_frame_is_attempted() {
        let ctx = run(
            Box::new(StubFrames::new(5)),
            ScriptedLandmarks::new(HashMap::new()),
            fast_config(),
        )
        .unwrap();

        assert_eq!(ctx.attempts(), 5);
        assert_eq!(ctx.detections(), 0);
        assert_eq!(ctx.face_shape(), None);
    }

    #[test]
    fn test_last_detection_wins() {
        let meshes = HashMap::from([
            (0, vec![mesh_with_jaw_size(4.0, 2.0)]),
            (2, vec![mesh_with_jaw_size(1.0, 10.0)]),
        ]);

        let ctx = run(
            Box::new(StubFrames::new(4)),
            ScriptedLandmarks::new(meshes),
            fast_config(),
        )
        .unwrap();

        assert_eq!(ctx.detections(), 2);
        assert_eq!(ctx.face_shape(), Some(FaceShape::Heart));
        assert_eq!(ctx.overlay(), Some("hairstyles/heart_face_style.png"));
        assert_eq!(ctx.last_frame(), Some(2));
    }

    #[test]
    fn test_recommendations_reported_in_frame_order() {
        let meshes = HashMap::from([
            (0, vec![mesh_with_jaw_size(4.0, 2.0)]),
            (1, vec![mesh_with_jaw_size(3.0, 3.0)]),
            (3, vec![mesh_with_jaw_size(12.0, 10.0)]),
        ]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let mut config = fast_config();
        config.on_recommendation = Some(Box::new(move |rec: &Recommendation| {
            seen_clone
                .lock()
                .unwrap()
                .push((rec.frame_index, rec.face_shape));
        }));

        run(
            Box::new(StubFrames::new(4)),
            ScriptedLandmarks::new(meshes),
            config,
        )
        .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (0, FaceShape::Round),
                (1, FaceShape::Rectangle),
                (3, FaceShape::Square),
            ]
        );
    }

    #[test]
    fn test_landmark_failure_counts_as_no_face() {
        let mut landmarks = ScriptedLandmarks::new(HashMap::from([
            (0, vec![mesh_with_jaw_size(4.0, 2.0)]),
            (1, vec![mesh_with_jaw_size(1.0, 10.0)]),
        ]));
        landmarks.failing = vec![1];

        let ctx = run(Box::new(StubFrames::new(3)), landmarks, fast_config()).unwrap();

        assert_eq!(ctx.attempts(), 3);
        assert_eq!(ctx.failures(), 1);
        assert_eq!(ctx.face_shape(), Some(FaceShape::Round));
    }

    #[test]
    fn test_frame_source_failure_ends_run_with_error() {
        let frames = StubFrames {
            count: 5,
            fail_at: Some(2),
        };

        let err = run(
            Box::new(frames),
            ScriptedLandmarks::new(HashMap::new()),
            fast_config(),
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "camera unplugged");
    }

    #[test]
    fn test_max_ticks_limits_endless_source() {
        let mut config = fast_config();
        config.max_ticks = Some(6);

        let ctx = run(
            Box::new(EndlessFrames),
            ScriptedLandmarks::new(HashMap::new()),
            config,
        )
        .unwrap();

        assert_eq!(ctx.attempts(), 6);
    }

    #[test]
    fn test_cancel_flag_stops_endless_source() {
        let config = fast_config();
        let cancelled = config.cancelled.clone();
        let stopper = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            cancelled.store(true, Ordering::Relaxed);
        });

        let result = run(
            Box::new(EndlessFrames),
            ScriptedLandmarks::new(HashMap::new()),
            config,
        );
        stopper.join().unwrap();

        assert!(result.is_ok());
    }

    #[test]
    fn test_slow_estimation_queues_attempts_instead_of_dropping_them() {
        let mut landmarks = ScriptedLandmarks::new(HashMap::from([(
            7,
            vec![mesh_with_jaw_size(14.0, 10.0)],
        )]));
        landmarks.delay = Duration::from_millis(5);
        let mut logger = LogDetectionLogger::new(100);

        let ctx = ThreadedDetectionLoop::new()
            .run(
                Box::new(StubFrames::new(8)),
                use_case(landmarks),
                DetectionContext::new(),
                &mut logger,
                fast_config(),
            )
            .unwrap();

        assert_eq!(ctx.attempts(), 8);
        assert_eq!(ctx.face_shape(), Some(FaceShape::Oval));
        assert_eq!(logger.timings_for("estimate").unwrap().len(), 8);
        assert_eq!(logger.metrics_for("pending_attempts").unwrap().len(), 8);
    }

    #[test]
    fn test_context_is_carried_across_runs() {
        let first = run(
            Box::new(StubFrames::new(1)),
            ScriptedLandmarks::new(HashMap::from([(0, vec![mesh_with_jaw_size(4.0, 2.0)])])),
            fast_config(),
        )
        .unwrap();

        let second = ThreadedDetectionLoop::new()
            .run(
                Box::new(StubFrames::new(2)),
                use_case(ScriptedLandmarks::new(HashMap::new())),
                first,
                &mut NullDetectionLogger,
                fast_config(),
            )
            .unwrap();

        assert_eq!(second.attempts(), 3);
        assert_eq!(second.face_shape(), Some(FaceShape::Round));
    }

    #[test]
    fn test_end_to_end_with_image_sequence_and_recording() {
        use crate::landmarks::infrastructure::landmark_recording::{
            LandmarkRecording, RecordedFrame,
        };
        use crate::landmarks::infrastructure::recorded_landmark_source::RecordedLandmarkSource;
        use crate::video::infrastructure::image_sequence_source::ImageSequenceSource;

        let dir = tempfile::tempdir().unwrap();
        let frames_dir = dir.path().join("frames");
        std::fs::create_dir(&frames_dir).unwrap();
        for i in 0..3 {
            image::RgbImage::new(8, 6)
                .save(frames_dir.join(format!("{i:03}.png")))
                .unwrap();
        }
        let recording = LandmarkRecording {
            frames: vec![RecordedFrame {
                index: 1,
                faces: vec![mesh_with_jaw_size(4.0, 2.0).points().to_vec()],
            }],
        };
        let recording_path = dir.path().join("rec.json");
        std::fs::write(&recording_path, serde_json::to_string(&recording).unwrap()).unwrap();

        let mut source = ImageSequenceSource::new();
        let metadata = source.open(&frames_dir).unwrap();
        let landmarks = RecordedLandmarkSource::from_file(&recording_path).unwrap();
        let mut config = fast_config();
        config.total_frames = metadata.total_frames;

        let ctx = ThreadedDetectionLoop::new()
            .run(
                Box::new(source),
                RecommendFaceShapeUseCase::new(
                    Box::new(landmarks),
                    RecommendationTable::default(),
                ),
                DetectionContext::new(),
                &mut NullDetectionLogger,
                config,
            )
            .unwrap();

        assert_eq!(ctx.attempts(), 3);
        assert_eq!(ctx.detections(), 1);
        assert_eq!(ctx.face_shape(), Some(FaceShape::Round));
        assert_eq!(ctx.overlay(), Some("hairstyles/round_face_style.png"));
        assert_eq!(ctx.last_frame(), Some(1));
    }
}

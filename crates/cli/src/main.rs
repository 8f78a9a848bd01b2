mod settings;

use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};

use faceshape_core::classification::domain::recommendation_table::{
    Recommendation, RecommendationTable,
};
use faceshape_core::classification::domain::shape_classifier::{classify_ratio, measure_jaw};
use faceshape_core::landmarks::infrastructure::landmark_recording::load_mesh;
use faceshape_core::landmarks::infrastructure::recorded_landmark_source::RecordedLandmarkSource;
use faceshape_core::pipeline::detection_context::DetectionContext;
use faceshape_core::pipeline::detection_logger::LogDetectionLogger;
use faceshape_core::pipeline::detection_loop::{DetectionLoop, LoopConfig};
use faceshape_core::pipeline::infrastructure::threaded_detection_loop::ThreadedDetectionLoop;
use faceshape_core::pipeline::recommend_face_shape_use_case::RecommendFaceShapeUseCase;
use faceshape_core::video::domain::frame_source::FrameSource;
use faceshape_core::video::infrastructure::image_sequence_source::ImageSequenceSource;

use crate::settings::Settings;

/// Face-shape detection and hairstyle recommendation from face-mesh landmarks.
#[derive(Parser)]
#[command(name = "faceshape")]
struct Cli {
    /// Settings file (default: <config dir>/FaceShape/settings.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify one face mesh stored as a JSON point array.
    Classify {
        /// Mesh file (468 or 478 points).
        mesh: PathBuf,
    },

    /// Run periodic detection over an image sequence with recorded landmarks.
    Watch {
        /// Image file or directory of frames (played in file-name order).
        frames: PathBuf,

        /// Landmark recording (JSON) keyed by frame index.
        #[arg(long)]
        landmarks: PathBuf,

        /// Milliseconds between frame pulls (overrides settings).
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Stop after this many ticks.
        #[arg(long)]
        max_ticks: Option<usize>,
    },

    /// Print the hairstyle recommendation table.
    Table,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    let table = RecommendationTable::with_overrides(&settings.hairstyles)?;

    match cli.command {
        Command::Classify { mesh } => run_classify(&mesh, &table, cli.json),
        Command::Watch {
            frames,
            landmarks,
            interval_ms,
            max_ticks,
        } => {
            let interval_ms = interval_ms.unwrap_or(settings.interval_ms);
            validate_watch(&frames, &landmarks, interval_ms)?;
            run_watch(
                &frames,
                &landmarks,
                Duration::from_millis(interval_ms),
                max_ticks,
                table,
                cli.json,
            )
        }
        Command::Table => {
            for line in format_table(&table, cli.json)? {
                println!("{line}");
            }
            Ok(())
        }
    }
}

fn run_classify(
    mesh_path: &Path,
    table: &RecommendationTable,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !mesh_path.exists() {
        return Err(format!("Mesh file not found: {}", mesh_path.display()).into());
    }
    let mesh = load_mesh(mesh_path)?;
    let jaw = measure_jaw(&mesh);
    log::info!(
        "Jaw width {:.2}, height {:.2}, ratio {:.3}",
        jaw.width,
        jaw.height,
        jaw.ratio()
    );
    let recommendation = table.recommendation(classify_ratio(jaw.ratio()), 0);
    println!("{}", format_recommendation(&recommendation, json)?);
    Ok(())
}

fn run_watch(
    frames_path: &Path,
    landmarks_path: &Path,
    interval: Duration,
    max_ticks: Option<usize>,
    table: RecommendationTable,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let landmarks = RecordedLandmarkSource::from_file(landmarks_path)?;
    log::info!(
        "Replaying landmarks for {} frames from {}",
        landmarks.recorded_frames(),
        landmarks_path.display()
    );

    let mut source = ImageSequenceSource::new();
    let metadata = source.open(frames_path)?;
    log::info!(
        "Frame source {}x{}, {} frames",
        metadata.width,
        metadata.height,
        metadata.total_frames.unwrap_or(0)
    );

    let mut config = LoopConfig::new(interval);
    config.max_ticks = max_ticks;
    config.total_frames = metadata.total_frames;
    config.on_recommendation = Some(Box::new(move |rec: &Recommendation| {
        match format_recommendation(rec, json) {
            Ok(line) => println!("{line}"),
            Err(e) => log::error!("Failed to format recommendation: {e}"),
        }
    }));

    let use_case = RecommendFaceShapeUseCase::new(Box::new(landmarks), table);
    let mut logger = LogDetectionLogger::default();
    let context = ThreadedDetectionLoop::new().run(
        Box::new(source),
        use_case,
        DetectionContext::new(),
        &mut logger,
        config,
    )?;

    eprintln!("{}", format_context(&context, json)?);
    Ok(())
}

fn validate_watch(
    frames: &Path,
    landmarks: &Path,
    interval_ms: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    if !frames.exists() {
        return Err(format!("Frame source not found: {}", frames.display()).into());
    }
    if !landmarks.exists() {
        return Err(format!("Landmark recording not found: {}", landmarks.display()).into());
    }
    if interval_ms == 0 {
        return Err("Interval must be at least 1ms".into());
    }
    Ok(())
}

fn format_recommendation(
    rec: &Recommendation,
    json: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    if json {
        return Ok(serde_json::to_string(rec)?);
    }
    Ok(format!(
        "frame {}: {} -> {}",
        rec.frame_index,
        rec.face_shape,
        rec.overlay.as_deref().unwrap_or("(no overlay)")
    ))
}

fn format_context(
    context: &DetectionContext,
    json: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    if json {
        return Ok(serde_json::to_string(context)?);
    }
    let shape = context
        .face_shape()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "none".to_string());
    Ok(format!(
        "Final face shape: {shape} ({} detections in {} attempts, {} failed)",
        context.detections(),
        context.attempts(),
        context.failures()
    ))
}

fn format_table(
    table: &RecommendationTable,
    json: bool,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    table
        .iter()
        .map(|(shape, path)| -> Result<String, Box<dyn std::error::Error>> {
            if json {
                Ok(serde_json::json!({ "face_shape": shape, "overlay": path }).to_string())
            } else {
                Ok(format!("{shape:10} {path}"))
            }
        })
        .collect()
}

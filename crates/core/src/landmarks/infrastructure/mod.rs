pub mod landmark_recording;
pub mod recorded_landmark_source;

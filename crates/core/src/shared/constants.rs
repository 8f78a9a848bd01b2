/// Point count of the base face-mesh topology.
pub const MESH_POINT_COUNT: usize = 468;

/// Point count when iris refinement is enabled; the first 468 points keep
/// the base topology.
pub const REFINED_MESH_POINT_COUNT: usize = 478;

pub const JAW_TOP_INDEX: usize = 10;
pub const JAW_BOTTOM_INDEX: usize = 152;
pub const JAW_LEFT_INDEX: usize = 234;
pub const JAW_RIGHT_INDEX: usize = 454;

/// Cadence of the detection loop.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

use std::time::Duration;

/// Cadence of the periodic frame sampler.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// Stability window between the first valid sample and the automatic commit.
pub const AUTO_CAPTURE_DELAY: Duration = Duration::from_millis(1500);

/// Reference frame the detector reports face geometry in.
pub const REFERENCE_FRAME_WIDTH: f64 = 640.0;
pub const REFERENCE_FRAME_HEIGHT: f64 = 480.0;

pub const EYE_OPEN_THRESHOLD: f64 = 0.5;
pub const MIN_FACE_SIZE: f64 = 60.0;
pub const MAX_HEAD_ROTATION_DEG: f64 = 30.0;

/// Fraction of the frame trimmed from each edge for the live centering check.
pub const CENTER_TOLERANCE: f64 = 0.05;
/// Edge trim used by the advisory checklist.
pub const CHECKLIST_CENTER_TOLERANCE: f64 = 0.025;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

pub const APP_DIR_NAME: &str = "FaceEnroll";
pub const ENROLLMENT_FILE_NAME: &str = "face_enrollment.json";

use std::path::PathBuf;

use thiserror::Error;

use crate::detection::domain::detected_face::DetectedFace;
use crate::shared::frame_handle::FrameHandle;

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("failed to read detections from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid detection data in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("face detector unavailable: {0}")]
    Unavailable(String),
}

/// Domain interface for face detection on a single still frame.
///
/// Implementations may keep state between frames, hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &FrameHandle) -> Result<Vec<DetectedFace>, DetectionError>;
}

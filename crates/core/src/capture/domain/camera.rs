use std::path::PathBuf;

use thiserror::Error;

use crate::shared::frame_handle::FrameHandle;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("failed to read frame source {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no frames available in {0}")]
    NoFrames(PathBuf),
    #[error("frame source exhausted")]
    Exhausted,
    #[error("camera is busy with another capture")]
    Busy,
    #[error("camera failure: {0}")]
    Device(String),
}

/// Domain interface for the still-photo capability of a camera.
///
/// Each call produces one frame handle or fails; the core never retries.
pub trait Camera: Send {
    fn capture(&mut self) -> Result<FrameHandle, CaptureError>;
}

use std::path::{Path, PathBuf};

/// Opaque reference to one still frame produced by a camera.
///
/// The core never looks at pixels; it only passes the handle from the camera
/// to the detector and, once committed, to the exchange-format encoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameHandle {
    path: PathBuf,
    sequence: u64,
}

impl FrameHandle {
    pub fn new(path: impl Into<PathBuf>, sequence: u64) -> Self {
        Self {
            path: path.into(),
            sequence,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Position of this frame in the camera's output order.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

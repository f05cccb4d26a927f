use std::fs;
use std::path::{Path, PathBuf};

use crate::capture::domain::camera::{Camera, CaptureError};
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame_handle::FrameHandle;

/// Adapts a directory of still images to the [`Camera`] interface.
///
/// Frames are served in file-name order. When `looping` is set the sequence
/// restarts after the last file; otherwise the camera reports
/// [`CaptureError::Exhausted`].
pub struct ReplayCamera {
    frames: Vec<PathBuf>,
    position: usize,
    sequence: u64,
    looping: bool,
}

impl ReplayCamera {
    pub fn open(dir: &Path, looping: bool) -> Result<Self, CaptureError> {
        let entries = fs::read_dir(dir).map_err(|source| CaptureError::Source {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut frames: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_image(path))
            .collect();
        frames.sort();

        if frames.is_empty() {
            return Err(CaptureError::NoFrames(dir.to_path_buf()));
        }
        log::debug!("Replay camera loaded {} frames from {}", frames.len(), dir.display());

        Ok(Self {
            frames,
            position: 0,
            sequence: 0,
            looping,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl Camera for ReplayCamera {
    fn capture(&mut self) -> Result<FrameHandle, CaptureError> {
        if self.position >= self.frames.len() {
            if !self.looping {
                return Err(CaptureError::Exhausted);
            }
            self.position = 0;
        }

        let frame = FrameHandle::new(self.frames[self.position].clone(), self.sequence);
        self.position += 1;
        self.sequence += 1;
        Ok(frame)
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir_with(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            fs::write(dir.path().join(name), b"frame").unwrap();
        }
        dir
    }

    #[test]
    fn test_serves_images_in_name_order_and_skips_others() {
        let dir = dir_with(&["0002.jpg", "0001.PNG", "0001.json", "notes.txt"]);
        let mut camera = ReplayCamera::open(dir.path(), false).unwrap();
        assert_eq!(camera.frame_count(), 2);

        let first = camera.capture().unwrap();
        let second = camera.capture().unwrap();
        assert!(first.path().ends_with("0001.PNG"));
        assert!(second.path().ends_with("0002.jpg"));
        assert_eq!(first.sequence(), 0);
        assert_eq!(second.sequence(), 1);
    }

    #[test]
    fn test_exhausts_without_looping() {
        let dir = dir_with(&["a.jpg"]);
        let mut camera = ReplayCamera::open(dir.path(), false).unwrap();
        camera.capture().unwrap();
        assert!(matches!(camera.capture(), Err(CaptureError::Exhausted)));
    }

    #[test]
    fn test_loops_with_increasing_sequence() {
        let dir = dir_with(&["a.jpg"]);
        let mut camera = ReplayCamera::open(dir.path(), true).unwrap();
        camera.capture().unwrap();
        let again = camera.capture().unwrap();
        assert!(again.path().ends_with("a.jpg"));
        assert_eq!(again.sequence(), 1);
    }

    #[test]
    fn test_empty_directory_errors() {
        let dir = dir_with(&["readme.md"]);
        assert!(matches!(
            ReplayCamera::open(dir.path(), false),
            Err(CaptureError::NoFrames(_))
        ));
    }

    #[test]
    fn test_missing_directory_errors() {
        let result = ReplayCamera::open(Path::new("/nonexistent/frames"), false);
        assert!(matches!(result, Err(CaptureError::Source { .. })));
    }
}

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::detection::domain::detected_face::DetectedFace;
use crate::detection::domain::face_detector::{DetectionError, FaceDetector};
use crate::shared::frame_handle::FrameHandle;

/// Reads pre-computed detections stored next to each frame.
///
/// For `frames/0001.jpg` the detections live in `frames/0001.json` as a JSON
/// array of [`DetectedFace`]. A frame without a sidecar file has no faces.
/// Lets recorded sessions be replayed without a detection model.
#[derive(Debug, Default)]
pub struct SidecarFaceDetector;

impl SidecarFaceDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn sidecar_path(frame_path: &Path) -> PathBuf {
        frame_path.with_extension("json")
    }
}

impl FaceDetector for SidecarFaceDetector {
    fn detect(&mut self, frame: &FrameHandle) -> Result<Vec<DetectedFace>, DetectionError> {
        let path = Self::sidecar_path(frame.path());
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(DetectionError::Read { path, source }),
        };
        serde_json::from_str(&json).map_err(|source| DetectionError::Parse { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_in(dir: &Path, name: &str) -> FrameHandle {
        let path = dir.join(name);
        fs::write(&path, b"jpeg").unwrap();
        FrameHandle::new(path, 0)
    }

    #[test]
    fn test_sidecar_path_replaces_extension() {
        let p = SidecarFaceDetector::sidecar_path(Path::new("/frames/0001.jpg"));
        assert_eq!(p, PathBuf::from("/frames/0001.json"));
    }

    #[test]
    fn test_missing_sidecar_means_no_faces() {
        let dir = tempfile::tempdir().unwrap();
        let frame = frame_in(dir.path(), "0001.jpg");
        let faces = SidecarFaceDetector::new().detect(&frame).unwrap();
        assert!(faces.is_empty());
    }

    #[test]
    fn test_reads_faces_from_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let frame = frame_in(dir.path(), "0001.jpg");
        fs::write(
            dir.path().join("0001.json"),
            r#"[{"bounds":{"left":270,"top":190,"width":100,"height":100},
                "left_eye_open":0.9,"right_eye_open":0.8,"yaw":5.0,"roll":-3.0}]"#,
        )
        .unwrap();

        let faces = SidecarFaceDetector::new().detect(&frame).unwrap();
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].left_eye_open, Some(0.9));
        assert_eq!(faces[0].roll, -3.0);
    }

    #[test]
    fn test_malformed_sidecar_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let frame = frame_in(dir.path(), "0001.jpg");
        fs::write(dir.path().join("0001.json"), "not json").unwrap();

        let err = SidecarFaceDetector::new().detect(&frame).unwrap_err();
        assert!(matches!(err, DetectionError::Parse { .. }));
    }
}

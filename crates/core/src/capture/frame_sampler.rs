use std::time::Duration;

use crate::capture::domain::camera::{Camera, CaptureError};
use crate::detection::domain::detected_face::DetectedFace;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame_handle::FrameHandle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SamplerState {
    Idle,
    Sampling,
}

/// What one sampling cycle saw. A failed capture leaves `frame` empty; any
/// failure leaves `faces` empty.
#[derive(Clone, Debug, Default)]
pub struct SampleOutcome {
    pub frame: Option<FrameHandle>,
    pub faces: Vec<DetectedFace>,
}

/// Captures a frame and runs detection, one cycle at a time.
///
/// The sampler owns the camera, so manual stills go through it as well and
/// share the same single-flight guard.
pub struct FrameSampler {
    camera: Box<dyn Camera>,
    detector: Box<dyn FaceDetector>,
    interval: Duration,
    state: SamplerState,
}

impl FrameSampler {
    pub fn new(camera: Box<dyn Camera>, detector: Box<dyn FaceDetector>, interval: Duration) -> Self {
        Self {
            camera,
            detector,
            interval,
            state: SamplerState::Idle,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    /// Claims the sampler. Returns `false` if a cycle is already running.
    pub fn try_begin(&mut self) -> bool {
        match self.state {
            SamplerState::Sampling => false,
            SamplerState::Idle => {
                self.state = SamplerState::Sampling;
                true
            }
        }
    }

    pub fn finish(&mut self) {
        self.state = SamplerState::Idle;
    }

    /// Runs one capture → detect cycle.
    ///
    /// Returns `None` when another cycle holds the sampler. Camera and
    /// detector failures are logged and reported as an empty outcome.
    pub fn sample(&mut self) -> Option<SampleOutcome> {
        if !self.try_begin() {
            log::debug!("Sampling cycle skipped: previous cycle still running");
            return None;
        }
        let outcome = self.capture_and_detect();
        self.finish();
        Some(outcome)
    }

    /// Takes one still outside the periodic loop. Errors are returned.
    pub fn capture_still(&mut self) -> Result<FrameHandle, CaptureError> {
        if !self.try_begin() {
            return Err(CaptureError::Busy);
        }
        let result = self.camera.capture();
        self.finish();
        result
    }

    fn capture_and_detect(&mut self) -> SampleOutcome {
        let frame = match self.camera.capture() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Sampling capture failed: {e}");
                return SampleOutcome::default();
            }
        };

        let faces = match self.detector.detect(&frame) {
            Ok(faces) => faces,
            Err(e) => {
                log::warn!("Face detection failed for frame {}: {e}", frame.sequence());
                Vec::new()
            }
        };

        SampleOutcome {
            frame: Some(frame),
            faces,
        }
    }
}

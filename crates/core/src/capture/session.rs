use crate::detection::domain::detected_face::DetectedFace;
use crate::shared::frame_handle::FrameHandle;
use crate::validation::face_validator::ValidationVerdict;

/// Where the session is in the capture → review → enrollment flow.
///
/// Replaces separate "review visible" / "replace dialog visible" flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Sampling,
    Review,
    AwaitingReplaceChoice,
    Enrolled,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureTrigger {
    Automatic,
    Manual,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CommittedImage {
    pub frame: FrameHandle,
    pub trigger: CaptureTrigger,
}

/// The most recent sampling cycle. Overwritten every cycle.
#[derive(Clone, Debug)]
pub struct LatestSample {
    pub frame: Option<FrameHandle>,
    pub faces: Vec<DetectedFace>,
    pub verdict: ValidationVerdict,
}

/// State of one enrollment attempt.
///
/// Mutated only through the capture coordinator and the enrollment decision
/// within this crate; callers get a read-only view.
#[derive(Debug)]
pub struct CaptureSession {
    active: bool,
    committed: Option<CommittedImage>,
    latest: Option<LatestSample>,
    phase: SessionPhase,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSession {
    pub fn new() -> Self {
        Self {
            active: true,
            committed: None,
            latest: None,
            phase: SessionPhase::Sampling,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn has_committed_image(&self) -> bool {
        self.committed.is_some()
    }

    pub fn committed_image(&self) -> Option<&CommittedImage> {
        self.committed.as_ref()
    }

    pub fn latest(&self) -> Option<&LatestSample> {
        self.latest.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Sampling runs only while active and nothing has been committed.
    pub fn can_sample(&self) -> bool {
        self.active && self.committed.is_none()
    }

    pub(crate) fn record_sample(&mut self, sample: LatestSample) {
        self.latest = Some(sample);
    }

    /// First caller wins; later calls leave the session untouched.
    pub(crate) fn commit(&mut self, frame: FrameHandle, trigger: CaptureTrigger) -> bool {
        if !self.can_sample() {
            return false;
        }
        self.committed = Some(CommittedImage { frame, trigger });
        self.active = false;
        self.phase = SessionPhase::Review;
        true
    }

    pub(crate) fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
    }

    /// Back to the initial sampling state, dropping the committed image.
    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    pub(crate) fn end(&mut self) {
        self.active = false;
        if self.phase != SessionPhase::Enrolled {
            self.phase = SessionPhase::Ended;
        }
    }
}

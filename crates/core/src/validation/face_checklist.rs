use crate::detection::domain::detected_face::DetectedFace;
use crate::validation::face_validator::ValidationCriteria;

/// Advisory per-criterion status for the face currently in view.
///
/// Informational only: it never gates a capture. Bounds are exclusive, so an
/// item can read as unchecked while the live verdict already accepts the face.
/// Centering uses `checklist_center_tolerance` rather than the live band.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FaceChecklist {
    pub eyes_open: bool,
    pub centered: bool,
    pub head_straight: bool,
    pub clear_face: bool,
}

impl FaceChecklist {
    pub fn evaluate(face: &DetectedFace, criteria: &ValidationCriteria) -> Self {
        let (left, right) = face.eye_open_probabilities();
        Self {
            eyes_open: left > criteria.eye_open_threshold && right > criteria.eye_open_threshold,
            centered: face
                .bounds
                .is_centered_in(&criteria.reference_frame, criteria.checklist_center_tolerance),
            head_straight: face.yaw.abs() < criteria.max_rotation_deg
                && face.roll.abs() < criteria.max_rotation_deg,
            clear_face: face.bounds.width > criteria.min_face_size
                && face.bounds.height > criteria.min_face_size,
        }
    }

    /// Checklist for a sample, shown only when exactly one face is in view.
    pub fn for_sample(faces: &[DetectedFace], criteria: &ValidationCriteria) -> Option<Self> {
        match faces {
            [face] => Some(Self::evaluate(face, criteria)),
            _ => None,
        }
    }

    pub fn all_checked(&self) -> bool {
        self.eyes_open && self.centered && self.head_straight && self.clear_face
    }
}

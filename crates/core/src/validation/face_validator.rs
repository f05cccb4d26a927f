use std::fmt;

use serde::{Deserialize, Serialize};

use crate::detection::domain::detected_face::DetectedFace;
use crate::shared::bounding_box::ReferenceFrame;
use crate::shared::constants::{
    CENTER_TOLERANCE, CHECKLIST_CENTER_TOLERANCE, EYE_OPEN_THRESHOLD, MAX_HEAD_ROTATION_DEG,
    MIN_FACE_SIZE,
};

/// Acceptance thresholds for a captured face.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationCriteria {
    pub eye_open_threshold: f64,
    pub min_face_size: f64,
    pub max_rotation_deg: f64,
    pub center_tolerance: f64,
    pub checklist_center_tolerance: f64,
    pub reference_frame: ReferenceFrame,
}

impl Default for ValidationCriteria {
    fn default() -> Self {
        Self {
            eye_open_threshold: EYE_OPEN_THRESHOLD,
            min_face_size: MIN_FACE_SIZE,
            max_rotation_deg: MAX_HEAD_ROTATION_DEG,
            center_tolerance: CENTER_TOLERANCE,
            checklist_center_tolerance: CHECKLIST_CENTER_TOLERANCE,
            reference_frame: ReferenceFrame::default(),
        }
    }
}

/// The rule that decided a verdict. Ordered by evaluation precedence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerdictReason {
    NoFace,
    MultipleFaces,
    EyesClosed,
    TooFar,
    HeadTurned,
    OffCenter,
    Accepted,
}

impl VerdictReason {
    pub fn message(self) -> &'static str {
        match self {
            VerdictReason::NoFace => "No face detected",
            VerdictReason::MultipleFaces => "Multiple faces detected",
            VerdictReason::EyesClosed => "Open your eyes",
            VerdictReason::TooFar => "Move closer",
            VerdictReason::HeadTurned => "Keep head straight",
            VerdictReason::OffCenter => "Center your face",
            VerdictReason::Accepted => "Perfect! Waiting for auto-capture...",
        }
    }
}

/// Result of validating one sample. Has no identity across samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidationVerdict {
    reason: VerdictReason,
}

impl ValidationVerdict {
    pub fn new(reason: VerdictReason) -> Self {
        Self { reason }
    }

    pub fn reason(&self) -> VerdictReason {
        self.reason
    }

    pub fn is_valid(&self) -> bool {
        self.reason == VerdictReason::Accepted
    }

    pub fn message(&self) -> &'static str {
        self.reason.message()
    }

    /// Whether the manual capture button is offered.
    ///
    /// Hard failures hide it; an otherwise acceptable face that is merely
    /// off-center may still be captured by hand.
    pub fn can_manually_capture(&self) -> bool {
        matches!(
            self.reason,
            VerdictReason::OffCenter | VerdictReason::Accepted
        )
    }
}

impl fmt::Display for ValidationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Scores a sample's detections against [`ValidationCriteria`].
#[derive(Clone, Debug, Default)]
pub struct FaceValidator {
    criteria: ValidationCriteria,
}

impl FaceValidator {
    pub fn new(criteria: ValidationCriteria) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &ValidationCriteria {
        &self.criteria
    }

    /// First failing rule wins; all must pass for a valid verdict.
    pub fn validate(&self, faces: &[DetectedFace]) -> ValidationVerdict {
        let face = match faces {
            [] => return ValidationVerdict::new(VerdictReason::NoFace),
            [face] => face,
            _ => return ValidationVerdict::new(VerdictReason::MultipleFaces),
        };
        ValidationVerdict::new(self.judge(face))
    }

    fn judge(&self, face: &DetectedFace) -> VerdictReason {
        let c = &self.criteria;

        let (left, right) = face.eye_open_probabilities();
        if left < c.eye_open_threshold || right < c.eye_open_threshold {
            return VerdictReason::EyesClosed;
        }
        if !face.bounds.is_at_least(c.min_face_size) {
            return VerdictReason::TooFar;
        }
        if face.yaw.abs() > c.max_rotation_deg || face.roll.abs() > c.max_rotation_deg {
            return VerdictReason::HeadTurned;
        }
        if !face
            .bounds
            .is_centered_in(&c.reference_frame, c.center_tolerance)
        {
            return VerdictReason::OffCenter;
        }
        VerdictReason::Accepted
    }
}

/// Validates with the default criteria.
pub fn validate(faces: &[DetectedFace]) -> ValidationVerdict {
    FaceValidator::default().validate(faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::bounding_box::BoundingBox;
    use rstest::rstest;

    fn good_face() -> DetectedFace {
        DetectedFace {
            bounds: BoundingBox::new(270.0, 190.0, 100.0, 100.0),
            left_eye_open: Some(0.9),
            right_eye_open: Some(0.9),
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
        }
    }

    fn face_with(edit: impl FnOnce(&mut DetectedFace)) -> DetectedFace {
        let mut face = good_face();
        edit(&mut face);
        face
    }

    #[test]
    fn test_no_face() {
        let v = validate(&[]);
        assert_eq!(v.reason(), VerdictReason::NoFace);
        assert_eq!(v.message(), "No face detected");
        assert!(!v.is_valid());
        assert!(!v.can_manually_capture());
    }

    #[test]
    fn test_multiple_faces() {
        let v = validate(&[good_face(), good_face()]);
        assert_eq!(v.message(), "Multiple faces detected");
        assert!(!v.is_valid());
        assert!(!v.can_manually_capture());
    }

    #[test]
    fn test_good_face_is_valid() {
        let v = validate(&[good_face()]);
        assert!(v.is_valid());
        assert!(v.can_manually_capture());
        assert_eq!(v.message(), "Perfect! Waiting for auto-capture...");
    }

    #[rstest]
    #[case::left_closed(Some(0.2), Some(0.9))]
    #[case::right_closed(Some(0.9), Some(0.49))]
    #[case::both_closed(Some(0.1), Some(0.1))]
    #[case::left_missing(None, Some(0.9))]
    #[case::both_missing(None, None)]
    fn test_closed_or_unknown_eyes(#[case] left: Option<f64>, #[case] right: Option<f64>) {
        let face = face_with(|f| {
            f.left_eye_open = left;
            f.right_eye_open = right;
        });
        let v = validate(&[face]);
        assert_eq!(v.message(), "Open your eyes");
        assert!(!v.can_manually_capture());
    }

    #[test]
    fn test_eye_threshold_is_inclusive() {
        let face = face_with(|f| {
            f.left_eye_open = Some(0.5);
            f.right_eye_open = Some(0.5);
        });
        assert!(validate(&[face]).is_valid());
    }

    #[test]
    fn test_closed_eyes_beat_every_other_failure() {
        // Tiny, turned and off-center, but the eyes rule is evaluated first.
        let face = DetectedFace {
            bounds: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            left_eye_open: Some(0.3),
            right_eye_open: Some(0.3),
            yaw: 80.0,
            pitch: 0.0,
            roll: -60.0,
        };
        let v = validate(&[face]);
        assert_eq!(v.reason(), VerdictReason::EyesClosed);
        assert!(!v.can_manually_capture());
    }

    #[rstest]
    #[case::narrow(59.0, 100.0)]
    #[case::short(100.0, 59.0)]
    fn test_too_small(#[case] w: f64, #[case] h: f64) {
        let face = face_with(|f| f.bounds = BoundingBox::new(320.0 - w / 2.0, 240.0 - h / 2.0, w, h));
        let v = validate(&[face]);
        assert_eq!(v.message(), "Move closer");
        assert!(!v.can_manually_capture());
    }

    #[rstest]
    #[case::yaw_right(31.0, 0.0)]
    #[case::yaw_left(-31.0, 0.0)]
    #[case::roll(0.0, 45.0)]
    fn test_head_turned(#[case] yaw: f64, #[case] roll: f64) {
        let face = face_with(|f| {
            f.yaw = yaw;
            f.roll = roll;
        });
        let v = validate(&[face]);
        assert_eq!(v.message(), "Keep head straight");
        assert!(!v.can_manually_capture());
    }

    #[test]
    fn test_rotation_limit_is_inclusive_and_pitch_ignored() {
        let face = face_with(|f| {
            f.yaw = 30.0;
            f.roll = -30.0;
            f.pitch = 70.0;
        });
        assert!(validate(&[face]).is_valid());
    }

    #[test]
    fn test_off_center_allows_manual_capture() {
        let face = face_with(|f| f.bounds = BoundingBox::new(560.0, 190.0, 100.0, 100.0));
        let v = validate(&[face]);
        assert_eq!(v.message(), "Center your face");
        assert!(!v.is_valid());
        assert!(v.can_manually_capture());
    }

    #[test]
    fn test_custom_criteria() {
        let validator = FaceValidator::new(ValidationCriteria {
            min_face_size: 150.0,
            ..ValidationCriteria::default()
        });
        assert_eq!(
            validator.validate(&[good_face()]).reason(),
            VerdictReason::TooFar
        );
    }

    #[test]
    fn test_every_passing_combination_is_valid() {
        for w in [60.0, 90.0, 200.0] {
            for yaw in [-30.0, 0.0, 29.5] {
                for roll in [-30.0, 12.0, 30.0] {
                    for eye in [0.5, 0.75, 1.0] {
                        for cx in [40.0, 320.0, 600.0] {
                            let face = DetectedFace {
                                bounds: BoundingBox::new(cx - w / 2.0, 240.0 - w / 2.0, w, w),
                                left_eye_open: Some(eye),
                                right_eye_open: Some(eye),
                                yaw,
                                pitch: 0.0,
                                roll,
                            };
                            assert!(validate(&[face]).is_valid());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_criteria_deserialize_partial() {
        let json = r#"{"min_face_size": 80}"#;
        let criteria: ValidationCriteria = serde_json::from_str(json).unwrap();
        assert_eq!(criteria.min_face_size, 80.0);
        assert_eq!(criteria.eye_open_threshold, 0.5);
    }
}

use serde::{Deserialize, Serialize};

use crate::shared::bounding_box::BoundingBox;

/// One face found in one sampled frame.
///
/// Rotation angles are in degrees: `yaw` turns left/right, `pitch` nods,
/// `roll` tilts toward a shoulder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    pub bounds: BoundingBox,
    #[serde(default)]
    pub left_eye_open: Option<f64>,
    #[serde(default)]
    pub right_eye_open: Option<f64>,
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub roll: f64,
}

impl DetectedFace {
    /// Eye-open probabilities with a missing classification read as closed.
    pub fn eye_open_probabilities(&self) -> (f64, f64) {
        (
            self.left_eye_open.unwrap_or(0.0),
            self.right_eye_open.unwrap_or(0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_eye_probability_reads_as_zero() {
        let face = DetectedFace {
            bounds: BoundingBox::new(0.0, 0.0, 100.0, 100.0),
            left_eye_open: Some(0.9),
            right_eye_open: None,
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
        };
        assert_eq!(face.eye_open_probabilities(), (0.9, 0.0));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{"bounds":{"left":10,"top":20,"width":100,"height":120}}"#;
        let face: DetectedFace = serde_json::from_str(json).unwrap();
        assert_eq!(face.bounds, BoundingBox::new(10.0, 20.0, 100.0, 120.0));
        assert!(face.left_eye_open.is_none());
        assert_eq!(face.yaw, 0.0);
    }
}

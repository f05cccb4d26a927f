use serde::{Deserialize, Serialize};

use crate::shared::constants::{REFERENCE_FRAME_HEIGHT, REFERENCE_FRAME_WIDTH};

/// Dimensions of the coordinate space the detector reports geometry in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFrame {
    pub width: f64,
    pub height: f64,
}

impl Default for ReferenceFrame {
    fn default() -> Self {
        Self {
            width: REFERENCE_FRAME_WIDTH,
            height: REFERENCE_FRAME_HEIGHT,
        }
    }
}

/// Axis-aligned face bounds in reference-frame pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// True when both sides are at least `min_size`.
    pub fn is_at_least(&self, min_size: f64) -> bool {
        self.width >= min_size && self.height >= min_size
    }

    /// True when the box center lies strictly inside `frame` shrunk by
    /// `tolerance` (a fraction of each dimension) on every edge.
    pub fn is_centered_in(&self, frame: &ReferenceFrame, tolerance: f64) -> bool {
        let (cx, cy) = self.center();
        let horizontal = cx > frame.width * tolerance && cx < frame.width * (1.0 - tolerance);
        let vertical = cy > frame.height * tolerance && cy < frame.height * (1.0 - tolerance);
        horizontal && vertical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_center() {
        let b = BoundingBox::new(100.0, 50.0, 200.0, 100.0);
        let (cx, cy) = b.center();
        assert_relative_eq!(cx, 200.0);
        assert_relative_eq!(cy, 100.0);
    }

    #[test]
    fn test_default_reference_frame_is_640_by_480() {
        let frame = ReferenceFrame::default();
        assert_relative_eq!(frame.width, 640.0);
        assert_relative_eq!(frame.height, 480.0);
    }

    #[rstest]
    #[case::exact(60.0, 60.0, true)]
    #[case::larger(120.0, 90.0, true)]
    #[case::narrow(59.9, 80.0, false)]
    #[case::short(80.0, 59.0, false)]
    fn test_is_at_least(#[case] w: f64, #[case] h: f64, #[case] expected: bool) {
        assert_eq!(BoundingBox::new(0.0, 0.0, w, h).is_at_least(60.0), expected);
    }

    // ── Centering ─────────────────────────────────────────────────────

    #[rstest]
    #[case::middle(320.0, 240.0, true)]
    #[case::just_inside_left(33.0, 240.0, true)]
    #[case::on_left_band_edge(32.0, 240.0, false)]
    #[case::on_right_band_edge(608.0, 240.0, false)]
    #[case::on_top_band_edge(320.0, 24.0, false)]
    #[case::on_bottom_band_edge(320.0, 456.0, false)]
    #[case::outside(700.0, 240.0, false)]
    fn test_is_centered_in_five_percent_band(
        #[case] cx: f64,
        #[case] cy: f64,
        #[case] expected: bool,
    ) {
        let b = BoundingBox::new(cx - 50.0, cy - 50.0, 100.0, 100.0);
        assert_eq!(b.is_centered_in(&ReferenceFrame::default(), 0.05), expected);
    }

    #[test]
    fn test_smaller_tolerance_accepts_faces_nearer_the_edge() {
        // center x = 20: outside the 5% band (32) but inside the 2.5% band (16)
        let b = BoundingBox::new(0.0, 190.0, 40.0, 100.0);
        let frame = ReferenceFrame::default();
        assert!(!b.is_centered_in(&frame, 0.05));
        assert!(b.is_centered_in(&frame, 0.025));
    }
}

//! Keypoint geometry in true image-pixel space.

use serde::{Deserialize, Serialize};

/// Confidence assigned to every keypoint placed or corrected by hand.
pub const MANUAL_CONFIDENCE: f64 = 1.0;

/// One located landmark in image-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    /// Detection confidence in `[0, 1]`.
    pub confidence: f64,
}

impl Keypoint {
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    /// A keypoint placed by the user, carrying full confidence.
    pub fn manual(x: f64, y: f64) -> Self {
        Self::new(x, y, MANUAL_CONFIDENCE)
    }

    /// Whether the pose engine actually located this landmark.
    ///
    /// The engine reports missing landmarks at or left/above the origin.
    pub fn is_detected(&self) -> bool {
        self.x > 0.0 && self.y > 0.0
    }
}

impl From<(f64, f64, f64)> for Keypoint {
    fn from((x, y, confidence): (f64, f64, f64)) -> Self {
        Self::new(x, y, confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_keypoint_is_fully_confident() {
        let kp = Keypoint::manual(12.0, 34.0);
        assert_eq!(kp.confidence, 1.0);
    }

    #[test]
    fn test_detection_requires_positive_coordinates() {
        assert!(Keypoint::new(1.0, 1.0, 0.2).is_detected());
        assert!(!Keypoint::new(0.0, 50.0, 0.9).is_detected());
        assert!(!Keypoint::new(50.0, -3.0, 0.9).is_detected());
        assert!(!Keypoint::default().is_detected());
    }
}

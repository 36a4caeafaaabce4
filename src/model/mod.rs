//! Data models for the golf keypoint workflow.

mod calibration;
mod keypoint;
mod landmark;
mod reference;

pub use calibration::{
    CalibrationStrategy, FeetLineMethod, ImageOrientation, NO_SHOULDER_TILT_WARNING, ShoulderTilt,
};
pub use keypoint::{Keypoint, MANUAL_CONFIDENCE};
pub use landmark::{BodyLandmark, LANDMARK_COUNT};
pub use reference::{CompleteReferenceMarks, ReferenceMarks, ReferenceTarget};

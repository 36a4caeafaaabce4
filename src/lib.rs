//! GKAT - Golf Keypoint Annotation Toolkit
//!
//! Client-side workflow for calibrating golf swing photos and correcting the
//! body keypoints a pose engine detects on them.

pub mod calibration;
pub mod config;
pub mod coordinate;
pub mod correction;
pub mod error;
pub mod model;
pub mod picker;
pub mod pose;
pub mod preview;
pub mod transport;
pub mod workflow;

pub use calibration::{CalibrationImageSet, CalibrationRequest, classify};
pub use config::AppConfig;
pub use coordinate::DisplayScale;
pub use correction::{CorrectionSession, ReviewState};
pub use error::{GkatError, Result};
pub use model::{
    BodyLandmark, CalibrationStrategy, FeetLineMethod, ImageOrientation, Keypoint,
    ReferenceTarget, ShoulderTilt,
};
pub use picker::{KeypointPicker, PickOutcome, PickState};
pub use pose::BodyLandmarkSet;
pub use transport::{KeypointsService, SessionToken, TransportError};
pub use workflow::{ImageSession, list_input_images};

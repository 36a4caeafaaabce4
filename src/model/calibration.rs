//! Calibration vocabulary shared with the keypoints service.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Camera angle of a swing image, as declared by the user at upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ImageOrientation {
    /// Not declared yet. Rejected by every operation that needs an orientation.
    #[default]
    Unspecified,
    /// Camera facing the golfer.
    FaceOn,
    /// Down-the-line: camera aligned with the target line.
    Dtl,
}

impl ImageOrientation {
    pub fn name(&self) -> &'static str {
        match self {
            ImageOrientation::Unspecified => "unspecified",
            ImageOrientation::FaceOn => "face-on",
            ImageOrientation::Dtl => "down-the-line",
        }
    }

    pub fn is_specified(&self) -> bool {
        !matches!(self, ImageOrientation::Unspecified)
    }
}

impl fmt::Display for ImageOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Degree of geometric calibration applied before measuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalibrationStrategy {
    NoCalibration,
    AxesOnly,
    FullCalibration,
}

impl CalibrationStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            CalibrationStrategy::NoCalibration => "no calibration",
            CalibrationStrategy::AxesOnly => "axes calibration only",
            CalibrationStrategy::FullCalibration => "full calibration",
        }
    }
}

impl fmt::Display for CalibrationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which foot landmarks define the feet line. Passed through to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeetLineMethod {
    #[default]
    UseHeelLine,
    UseToeLine,
}

/// Warning attached to the default shoulder tilt.
pub const NO_SHOULDER_TILT_WARNING: &str = "no shoulder tilt";

/// Shoulder tilt for DTL images with an optional warning. Passed through to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoulderTilt {
    pub value: f64,
    #[serde(default)]
    pub warning: Option<String>,
}

impl ShoulderTilt {
    /// A tilt entered by the user; carries no warning.
    pub fn measured(value: f64) -> Self {
        Self {
            value,
            warning: None,
        }
    }
}

impl Default for ShoulderTilt {
    fn default() -> Self {
        Self {
            value: 0.0,
            warning: Some(NO_SHOULDER_TILT_WARNING.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(ImageOrientation::default(), ImageOrientation::Unspecified);
        assert_eq!(FeetLineMethod::default(), FeetLineMethod::UseHeelLine);

        let tilt = ShoulderTilt::default();
        assert_eq!(tilt.value, 0.0);
        assert_eq!(tilt.warning.as_deref(), Some(NO_SHOULDER_TILT_WARNING));
        assert_eq!(ShoulderTilt::measured(12.5).warning, None);
    }

    #[test]
    fn test_feet_line_serde_names() {
        let json = serde_json::to_string(&FeetLineMethod::UseToeLine).unwrap();
        assert_eq!(json, "\"use_toe_line\"");
    }
}

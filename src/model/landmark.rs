//! The body-25 landmark layout.
//!
//! The pose engine emits its 25 keypoints in a fixed order. [`BodyLandmark::ALL`]
//! is that order: the landmark at position `i` names the engine's entry `i`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GkatError;

/// Number of landmarks in the body-25 layout.
pub const LANDMARK_COUNT: usize = 25;

/// A named landmark of the body-25 pose layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(usize)]
pub enum BodyLandmark {
    Nose = 0,
    Neck = 1,
    RShoulder = 2,
    RElbow = 3,
    RWrist = 4,
    LShoulder = 5,
    LElbow = 6,
    LWrist = 7,
    MidHip = 8,
    RHip = 9,
    RKnee = 10,
    RAnkle = 11,
    LHip = 12,
    LKnee = 13,
    LAnkle = 14,
    REye = 15,
    LEye = 16,
    REar = 17,
    LEar = 18,
    LBigToe = 19,
    LSmallToe = 20,
    LHeel = 21,
    RBigToe = 22,
    RSmallToe = 23,
    RHeel = 24,
}

impl BodyLandmark {
    /// All landmarks in pose engine output order.
    pub const ALL: [BodyLandmark; LANDMARK_COUNT] = [
        BodyLandmark::Nose,
        BodyLandmark::Neck,
        BodyLandmark::RShoulder,
        BodyLandmark::RElbow,
        BodyLandmark::RWrist,
        BodyLandmark::LShoulder,
        BodyLandmark::LElbow,
        BodyLandmark::LWrist,
        BodyLandmark::MidHip,
        BodyLandmark::RHip,
        BodyLandmark::RKnee,
        BodyLandmark::RAnkle,
        BodyLandmark::LHip,
        BodyLandmark::LKnee,
        BodyLandmark::LAnkle,
        BodyLandmark::REye,
        BodyLandmark::LEye,
        BodyLandmark::REar,
        BodyLandmark::LEar,
        BodyLandmark::LBigToe,
        BodyLandmark::LSmallToe,
        BodyLandmark::LHeel,
        BodyLandmark::RBigToe,
        BodyLandmark::RSmallToe,
        BodyLandmark::RHeel,
    ];

    /// Position of this landmark in the engine's output array.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Landmark at an output array position.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Canonical name, as used on the wire and in exported records.
    pub fn name(self) -> &'static str {
        match self {
            BodyLandmark::Nose => "Nose",
            BodyLandmark::Neck => "Neck",
            BodyLandmark::RShoulder => "RShoulder",
            BodyLandmark::RElbow => "RElbow",
            BodyLandmark::RWrist => "RWrist",
            BodyLandmark::LShoulder => "LShoulder",
            BodyLandmark::LElbow => "LElbow",
            BodyLandmark::LWrist => "LWrist",
            BodyLandmark::MidHip => "MidHip",
            BodyLandmark::RHip => "RHip",
            BodyLandmark::RKnee => "RKnee",
            BodyLandmark::RAnkle => "RAnkle",
            BodyLandmark::LHip => "LHip",
            BodyLandmark::LKnee => "LKnee",
            BodyLandmark::LAnkle => "LAnkle",
            BodyLandmark::REye => "REye",
            BodyLandmark::LEye => "LEye",
            BodyLandmark::REar => "REar",
            BodyLandmark::LEar => "LEar",
            BodyLandmark::LBigToe => "LBigToe",
            BodyLandmark::LSmallToe => "LSmallToe",
            BodyLandmark::LHeel => "LHeel",
            BodyLandmark::RBigToe => "RBigToe",
            BodyLandmark::RSmallToe => "RSmallToe",
            BodyLandmark::RHeel => "RHeel",
        }
    }

    /// Human-readable label for review prompts and warnings.
    pub fn label(self) -> &'static str {
        match self {
            BodyLandmark::Nose => "nose",
            BodyLandmark::Neck => "neck",
            BodyLandmark::RShoulder => "right shoulder",
            BodyLandmark::RElbow => "right elbow",
            BodyLandmark::RWrist => "right wrist",
            BodyLandmark::LShoulder => "left shoulder",
            BodyLandmark::LElbow => "left elbow",
            BodyLandmark::LWrist => "left wrist",
            BodyLandmark::MidHip => "mid hip",
            BodyLandmark::RHip => "right hip",
            BodyLandmark::RKnee => "right knee",
            BodyLandmark::RAnkle => "right ankle",
            BodyLandmark::LHip => "left hip",
            BodyLandmark::LKnee => "left knee",
            BodyLandmark::LAnkle => "left ankle",
            BodyLandmark::REye => "right eye",
            BodyLandmark::LEye => "left eye",
            BodyLandmark::REar => "right ear",
            BodyLandmark::LEar => "left ear",
            BodyLandmark::LBigToe => "left big toe",
            BodyLandmark::LSmallToe => "left small toe",
            BodyLandmark::LHeel => "left heel",
            BodyLandmark::RBigToe => "right big toe",
            BodyLandmark::RSmallToe => "right small toe",
            BodyLandmark::RHeel => "right heel",
        }
    }
}

impl fmt::Display for BodyLandmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BodyLandmark {
    type Err = GkatError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|landmark| landmark.name() == name)
            .ok_or_else(|| GkatError::unknown_landmark(name))
    }
}

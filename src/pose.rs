//! Named body-25 records built from pose engine output.
//!
//! The pose engine returns a flat array of `(x, y, confidence)` triples whose
//! meaning depends only on position. [`BodyLandmarkSet`] attaches the
//! canonical landmark names to those positions and lets individual landmarks be
//! corrected afterwards.

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{GkatError, Result};
use crate::model::{BodyLandmark, Keypoint, LANDMARK_COUNT, MANUAL_CONFIDENCE};

/// One raw pose engine output entry: `(x, y, confidence)`.
pub type PoseEntry = (f64, f64, f64);

/// The 25 body landmarks of one image, in pose engine order.
///
/// Always fully populated: a set either comes whole from engine output or does
/// not exist. Undetected landmarks are stored like any other.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "HashMap<String, Keypoint>")]
pub struct BodyLandmarkSet {
    keypoints: [Keypoint; LANDMARK_COUNT],
}

impl BodyLandmarkSet {
    /// Map pose engine output to named landmarks.
    ///
    /// Entry `i` becomes landmark `BodyLandmark::ALL[i]`. Any length other than 25
    /// is rejected with `MalformedPoseData`.
    pub fn from_flat_array(entries: &[PoseEntry]) -> Result<Self> {
        if entries.len() != LANDMARK_COUNT {
            return Err(GkatError::malformed_pose(LANDMARK_COUNT, entries.len()));
        }

        let mut keypoints = [Keypoint::default(); LANDMARK_COUNT];
        for (slot, entry) in keypoints.iter_mut().zip(entries) {
            *slot = Keypoint::from(*entry);
        }

        let set = Self { keypoints };
        log::debug!(
            "Mapped pose output: {}/{} landmarks detected",
            set.detected().count(),
            LANDMARK_COUNT
        );
        Ok(set)
    }

    /// Back to the engine's flat layout.
    pub fn to_flat_array(&self) -> Vec<PoseEntry> {
        self.keypoints
            .iter()
            .map(|kp| (kp.x, kp.y, kp.confidence))
            .collect()
    }

    /// Keypoint for a landmark.
    #[inline]
    pub fn keypoint(&self, landmark: BodyLandmark) -> &Keypoint {
        &self.keypoints[landmark.index()]
    }

    /// Keypoint for a landmark name, or `None` if the name is not body-25.
    pub fn get(&self, name: &str) -> Option<&Keypoint> {
        name.parse::<BodyLandmark>()
            .ok()
            .map(|landmark| self.keypoint(landmark))
    }

    /// Replace a landmark's keypoint.
    pub fn set(&mut self, landmark: BodyLandmark, keypoint: Keypoint) {
        self.keypoints[landmark.index()] = keypoint;
    }

    /// Overwrite the landmark called `name`, leaving the other 24 untouched.
    ///
    /// Fails with `UnknownLandmarkName`, changing nothing, if `name` is not one of
    /// the body-25 names.
    pub fn set_landmark(&mut self, name: &str, x: f64, y: f64, confidence: f64) -> Result<()> {
        let landmark: BodyLandmark = name.parse()?;
        self.set(landmark, Keypoint::new(x, y, confidence));
        Ok(())
    }

    /// Like [`set_landmark`](Self::set_landmark) with manual confidence, returning the updated set.
    pub fn with_landmark(mut self, name: &str, x: f64, y: f64) -> Result<Self> {
        self.set_landmark(name, x, y, MANUAL_CONFIDENCE)?;
        Ok(self)
    }

    /// All landmarks with their keypoints, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyLandmark, &Keypoint)> + '_ {
        BodyLandmark::ALL.into_iter().zip(self.keypoints.iter())
    }

    /// Landmarks the engine located.
    pub fn detected(&self) -> impl Iterator<Item = (BodyLandmark, &Keypoint)> + '_ {
        self.iter().filter(|(_, kp)| kp.is_detected())
    }

    /// Landmarks the engine reported as missing.
    pub fn undetected(&self) -> impl Iterator<Item = (BodyLandmark, &Keypoint)> + '_ {
        self.iter().filter(|(_, kp)| !kp.is_detected())
    }

    /// Check every landmark and report the doubtful ones.
    ///
    /// A landmark that was not detected is a severe warning; one whose confidence
    /// is below `threshold` is a minor warning.
    pub fn verify(&self, threshold: f64) -> Vec<LandmarkWarning> {
        self.iter()
            .filter_map(|(landmark, kp)| LandmarkWarning::check(landmark, kp, threshold))
            .collect()
    }

    /// Landmarks whose keypoints differ between `self` and `other`.
    pub fn diff(&self, other: &BodyLandmarkSet) -> Vec<BodyLandmark> {
        self.iter()
            .zip(other.keypoints.iter())
            .filter(|((_, a), b)| a != b)
            .map(|((landmark, _), _)| landmark)
            .collect()
    }

    /// Export to pretty JSON keyed by landmark name.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Import from JSON keyed by landmark name.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Index<BodyLandmark> for BodyLandmarkSet {
    type Output = Keypoint;

    fn index(&self, landmark: BodyLandmark) -> &Keypoint {
        self.keypoint(landmark)
    }
}

impl Index<&str> for BodyLandmarkSet {
    type Output = Keypoint;

    /// Panics on names outside body-25; use [`BodyLandmarkSet::get`] to avoid that.
    fn index(&self, name: &str) -> &Keypoint {
        match self.get(name) {
            Some(kp) => kp,
            None => panic!("unknown body-25 landmark '{}'", name),
        }
    }
}

impl Serialize for BodyLandmarkSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(LANDMARK_COUNT))?;
        for (landmark, kp) in self.iter() {
            map.serialize_entry(landmark.name(), kp)?;
        }
        map.end()
    }
}

impl TryFrom<HashMap<String, Keypoint>> for BodyLandmarkSet {
    type Error = GkatError;

    fn try_from(mut named: HashMap<String, Keypoint>) -> Result<Self> {
        // Names are checked first so a misspelt key is reported as such.
        if let Some(unknown) = named
            .keys()
            .find(|name| name.parse::<BodyLandmark>().is_err())
        {
            return Err(GkatError::unknown_landmark(unknown.as_str()));
        }

        let found = named.len();
        let mut keypoints = [Keypoint::default(); LANDMARK_COUNT];
        for landmark in BodyLandmark::ALL {
            keypoints[landmark.index()] = named
                .remove(landmark.name())
                .ok_or_else(|| GkatError::malformed_pose(LANDMARK_COUNT, found))?;
        }
        Ok(Self { keypoints })
    }
}

/// How serious a landmark warning is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WarningSeverity {
    /// Located, but with low confidence.
    Minor,
    /// Not located at all.
    Severe,
}

/// A doubtful landmark found by [`BodyLandmarkSet::verify`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkWarning {
    pub landmark: BodyLandmark,
    pub severity: WarningSeverity,
    pub confidence: f64,
}

impl LandmarkWarning {
    fn check(landmark: BodyLandmark, kp: &Keypoint, threshold: f64) -> Option<Self> {
        let severity = if !kp.is_detected() {
            WarningSeverity::Severe
        } else if kp.confidence < threshold {
            WarningSeverity::Minor
        } else {
            return None;
        };
        Some(Self {
            landmark,
            severity,
            confidence: kp.confidence,
        })
    }
}

impl fmt::Display for LandmarkWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.landmark.label();
        match self.severity {
            WarningSeverity::Severe => write!(f, "could not find keypoint {}", label),
            WarningSeverity::Minor => write!(
                f,
                "uncertain where {} is, confidence is {:.3}. please make sure {} is visible in image",
                label, self.confidence, label
            ),
        }
    }
}

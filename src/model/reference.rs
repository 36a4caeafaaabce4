//! Reference marks placed by the user to anchor calibration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GkatError, Result};
use crate::model::Keypoint;

/// Which reference point is being marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceTarget {
    GolfBall,
    ClubButt,
    ClubHead,
}

impl ReferenceTarget {
    /// Display name used in prompts and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ReferenceTarget::GolfBall => "golf ball",
            ReferenceTarget::ClubButt => "club butt",
            ReferenceTarget::ClubHead => "club head",
        }
    }

    /// Question shown to the user when confirming a candidate.
    pub fn confirm_prompt(&self) -> &'static str {
        match self {
            ReferenceTarget::GolfBall => "Is this the correct spot for the golf ball?",
            ReferenceTarget::ClubButt => "Is this the correct spot for the butt end of the club?",
            ReferenceTarget::ClubHead => "Is this the correct spot for the clubhead?",
        }
    }

    /// All targets in the order the user is usually asked for them.
    pub fn all() -> &'static [ReferenceTarget] {
        &[
            ReferenceTarget::GolfBall,
            ReferenceTarget::ClubButt,
            ReferenceTarget::ClubHead,
        ]
    }
}

impl fmt::Display for ReferenceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The three user-identified reference points, filled one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReferenceMarks {
    pub golf_ball: Option<Keypoint>,
    pub club_butt: Option<Keypoint>,
    pub club_head: Option<Keypoint>,
}

impl ReferenceMarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the mark for a target, if placed.
    pub fn get(&self, target: ReferenceTarget) -> Option<Keypoint> {
        match target {
            ReferenceTarget::GolfBall => self.golf_ball,
            ReferenceTarget::ClubButt => self.club_butt,
            ReferenceTarget::ClubHead => self.club_head,
        }
    }

    /// Place or replace the mark for a target.
    pub fn set(&mut self, target: ReferenceTarget, keypoint: Keypoint) {
        let slot = match target {
            ReferenceTarget::GolfBall => &mut self.golf_ball,
            ReferenceTarget::ClubButt => &mut self.club_butt,
            ReferenceTarget::ClubHead => &mut self.club_head,
        };
        *slot = Some(keypoint);
    }

    /// Targets that have not been marked yet.
    pub fn missing(&self) -> Vec<ReferenceTarget> {
        ReferenceTarget::all()
            .iter()
            .copied()
            .filter(|t| self.get(*t).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// All three marks, or `IncompleteReferenceMarks` naming the missing ones.
    pub fn complete(&self) -> Result<CompleteReferenceMarks> {
        match (self.golf_ball, self.club_butt, self.club_head) {
            (Some(golf_ball), Some(club_butt), Some(club_head)) => Ok(CompleteReferenceMarks {
                golf_ball,
                club_butt,
                club_head,
            }),
            _ => Err(GkatError::IncompleteReferenceMarks {
                missing: self.missing(),
            }),
        }
    }
}

/// Reference marks with every point present, as sent for calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompleteReferenceMarks {
    pub golf_ball: Keypoint,
    pub club_butt: Keypoint,
    pub club_head: Keypoint,
}

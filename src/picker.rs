//! Reference point picking on the preview canvas.
//!
//! The user chooses a target (golf ball, club butt, club head), clicks the
//! preview, and confirms or rejects each candidate. Only one target can be
//! picked at a time.

use crate::coordinate::DisplayScale;
use crate::error::{GkatError, Result};
use crate::model::{Keypoint, ReferenceMarks, ReferenceTarget};

/// State of the picking interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickState {
    /// No pick in progress; clicks on the preview are errors.
    #[default]
    Idle,
    AwaitingGolfBall,
    AwaitingClubButt,
    AwaitingClubHead,
}

impl PickState {
    fn awaiting(target: ReferenceTarget) -> Self {
        match target {
            ReferenceTarget::GolfBall => PickState::AwaitingGolfBall,
            ReferenceTarget::ClubButt => PickState::AwaitingClubButt,
            ReferenceTarget::ClubHead => PickState::AwaitingClubHead,
        }
    }

    /// The target awaiting a click, or `None` when idle.
    pub fn target(&self) -> Option<ReferenceTarget> {
        match self {
            PickState::Idle => None,
            PickState::AwaitingGolfBall => Some(ReferenceTarget::GolfBall),
            PickState::AwaitingClubButt => Some(ReferenceTarget::ClubButt),
            PickState::AwaitingClubHead => Some(ReferenceTarget::ClubHead),
        }
    }
}

/// A mapped click waiting for the user's verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub target: ReferenceTarget,
    /// Question to put to the user.
    pub prompt: &'static str,
    /// Where the user clicked, in preview pixels (for drawing the marker).
    pub display: (f64, f64),
    /// The keypoint that will be stored if accepted.
    pub keypoint: Keypoint,
}

/// Asks the user whether a candidate is the right spot.
///
/// Implemented by the presentation layer. Closures taking a `&Candidate` and
/// returning `bool` implement it too.
pub trait ConfirmCandidate {
    /// Return true to accept the candidate, false to discard it.
    fn confirm(&mut self, candidate: &Candidate) -> bool;
}

impl<F> ConfirmCandidate for F
where
    F: FnMut(&Candidate) -> bool,
{
    fn confirm(&mut self, candidate: &Candidate) -> bool {
        self(candidate)
    }
}

/// What happened to a submitted candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickOutcome {
    /// Stored in the reference marks; the picker is idle again.
    Accepted(Keypoint),
    /// Discarded; the picker still awaits the same target.
    Rejected,
}

/// Walks the user through marking the reference points on one image.
#[derive(Debug, Clone, Default)]
pub struct KeypointPicker {
    state: PickState,
    scale: DisplayScale,
    marks: ReferenceMarks,
}

impl KeypointPicker {
    /// Create an idle picker for a preview drawn at `scale`.
    pub fn new(scale: DisplayScale) -> Self {
        Self {
            state: PickState::Idle,
            scale,
            marks: ReferenceMarks::new(),
        }
    }

    pub fn state(&self) -> PickState {
        self.state
    }

    pub fn scale(&self) -> DisplayScale {
        self.scale
    }

    pub fn marks(&self) -> &ReferenceMarks {
        &self.marks
    }

    /// Start picking a target. Only allowed while idle.
    pub fn begin_pick(&mut self, target: ReferenceTarget) -> Result<()> {
        if let Some(active) = self.state.target() {
            return Err(GkatError::PickAlreadyInProgress {
                active,
                requested: target,
            });
        }
        self.state = PickState::awaiting(target);
        log::debug!("Picking {}", target);
        Ok(())
    }

    /// Map a click on the preview and let the user confirm it.
    ///
    /// On acceptance the keypoint replaces any earlier mark for the target and the
    /// picker returns to idle. On rejection nothing is stored and the same target
    /// stays active for another attempt.
    pub fn submit_candidate(
        &mut self,
        display_x: f64,
        display_y: f64,
        confirm: &mut impl ConfirmCandidate,
    ) -> Result<PickOutcome> {
        let target = self.state.target().ok_or(GkatError::NoActivePick)?;

        let (x, y) = self.scale.to_image_space(display_x, display_y);
        let candidate = Candidate {
            target,
            prompt: target.confirm_prompt(),
            display: (display_x, display_y),
            keypoint: Keypoint::manual(x, y),
        };
        log::trace!(
            "Candidate for {}: display ({:.1}, {:.1}) -> image ({:.1}, {:.1})",
            target,
            display_x,
            display_y,
            x,
            y
        );

        if !confirm.confirm(&candidate) {
            log::debug!("Rejected {} candidate", target);
            return Ok(PickOutcome::Rejected);
        }

        if self.marks.get(target).is_some() {
            log::debug!("Replacing previous {} mark", target);
        }
        self.marks.set(target, candidate.keypoint);
        self.state = PickState::Idle;
        log::info!("Marked {} at ({:.1}, {:.1})", target, x, y);
        if self.marks.is_complete() {
            log::debug!("All reference marks placed");
        }
        Ok(PickOutcome::Accepted(candidate.keypoint))
    }

    /// Abandon the current pick, if any. Marks are left as they are.
    pub fn cancel(&mut self) {
        if let Some(target) = self.state.target() {
            log::debug!("Cancelled picking {}", target);
        }
        self.state = PickState::Idle;
    }
}

//! Interactive review and correction of body landmarks.
//!
//! A [`CorrectionSession`] walks the user through every landmark of a
//! [`BodyLandmarkSet`], applies their corrections with full confidence, and
//! produces the record to persist. Corrections can be undone and redone.

use crate::error::{GkatError, Result};
use crate::model::{BodyLandmark, Keypoint, LANDMARK_COUNT, MANUAL_CONFIDENCE};
use crate::pose::BodyLandmarkSet;

// ============================================================================
// Edit History
// ============================================================================

/// One applied correction, with enough information to reverse it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkEdit {
    pub landmark: BodyLandmark,
    /// Keypoint before the edit
    pub old: Keypoint,
    /// Keypoint after the edit
    pub new: Keypoint,
}

impl LandmarkEdit {
    /// Human-readable description for undo/redo menus.
    pub fn description(&self) -> String {
        format!("Move {}", self.landmark.label())
    }
}

/// Undo/redo stacks for landmark edits.
///
/// A new edit clears the redo stack. Undo moves the newest edit to the redo
/// stack and redo moves it back.
#[derive(Debug, Clone)]
pub struct EditHistory {
    undo_stack: Vec<LandmarkEdit>,
    redo_stack: Vec<LandmarkEdit>,
    max_history: usize,
}

impl EditHistory {
    /// Default number of edits kept for undo.
    pub const DEFAULT_MAX_HISTORY: usize = 100;

    pub fn new(max_history: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_history,
        }
    }

    /// Record an edit that has just been applied.
    pub fn push(&mut self, edit: LandmarkEdit) {
        log::debug!("Undo: pushed '{}'", edit.description());
        self.undo_stack.push(edit);
        self.redo_stack.clear();

        while self.undo_stack.len() > self.max_history {
            self.undo_stack.remove(0);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn pop_undo(&mut self) -> Option<LandmarkEdit> {
        let edit = self.undo_stack.pop()?;
        log::debug!("Undo: '{}'", edit.description());
        self.redo_stack.push(edit);
        Some(edit)
    }

    fn pop_redo(&mut self) -> Option<LandmarkEdit> {
        let edit = self.redo_stack.pop()?;
        log::debug!("Redo: '{}'", edit.description());
        self.undo_stack.push(edit);
        Some(edit)
    }

    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(|e| e.description())
    }

    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|e| e.description())
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_HISTORY)
    }
}

// ============================================================================
// Review
// ============================================================================

/// Where a session is in its review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewState {
    /// Created, review not started.
    #[default]
    Pending,
    /// A review pass is open; another cannot start until it is finalized.
    Reviewing,
    /// The corrected record has been produced.
    Finalized,
}

/// Landmarks to present to the user, in canonical order.
///
/// A snapshot taken when the review started; it is consumed as it is iterated
/// and cannot be rewound.
#[derive(Debug, Clone)]
pub struct ReviewQueue {
    items: std::array::IntoIter<(BodyLandmark, Keypoint), LANDMARK_COUNT>,
}

impl Iterator for ReviewQueue {
    type Item = (BodyLandmark, Keypoint);

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl ExactSizeIterator for ReviewQueue {}

impl std::iter::FusedIterator for ReviewQueue {}

/// Review and correction of one landmark set.
#[derive(Debug, Clone)]
pub struct CorrectionSession {
    input_image_id: String,
    original: BodyLandmarkSet,
    current: BodyLandmarkSet,
    state: ReviewState,
    history: EditHistory,
}

impl CorrectionSession {
    /// Create a session over a landmark set not tied to a stored image.
    pub fn new(set: BodyLandmarkSet) -> Self {
        Self::for_image(String::new(), set)
    }

    /// Create a session for the landmarks of a stored input image.
    pub fn for_image(input_image_id: impl Into<String>, set: BodyLandmarkSet) -> Self {
        Self {
            input_image_id: input_image_id.into(),
            original: set,
            current: set,
            state: ReviewState::Pending,
            history: EditHistory::default(),
        }
    }

    /// Limit how many edits can be undone.
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.history = EditHistory::new(max_history);
        self
    }

    pub fn input_image_id(&self) -> &str {
        &self.input_image_id
    }

    pub fn state(&self) -> ReviewState {
        self.state
    }

    /// The set as it came from the pose engine.
    pub fn original(&self) -> &BodyLandmarkSet {
        &self.original
    }

    /// The set with all edits so far.
    pub fn current(&self) -> &BodyLandmarkSet {
        &self.current
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    /// Begin a review pass over every landmark.
    ///
    /// Fails with `SessionAlreadyActive` while an earlier pass has not been
    /// finalized. Starting again after [`finalize`](Self::finalize) opens a new pass.
    pub fn start(&mut self) -> Result<ReviewQueue> {
        if self.state == ReviewState::Reviewing {
            return Err(GkatError::SessionAlreadyActive {
                input_image_id: self.input_image_id.clone(),
            });
        }

        let mut items = [(BodyLandmark::Nose, Keypoint::default()); LANDMARK_COUNT];
        for (item, (landmark, kp)) in items.iter_mut().zip(self.current.iter()) {
            *item = (landmark, *kp);
        }
        self.state = ReviewState::Reviewing;
        log::debug!("Started landmark review for '{}'", self.input_image_id);
        Ok(ReviewQueue {
            items: items.into_iter(),
        })
    }

    /// Move the landmark called `name` to `(x, y)` with full confidence.
    ///
    /// Unknown names fail with `UnknownLandmarkName` and change nothing.
    pub fn apply_edit(&mut self, name: &str, x: f64, y: f64) -> Result<&BodyLandmarkSet> {
        let landmark: BodyLandmark = name.parse()?;
        let old = *self.current.keypoint(landmark);
        self.current.set_landmark(name, x, y, MANUAL_CONFIDENCE)?;

        let new = *self.current.keypoint(landmark);
        log::debug!(
            "Corrected {}: ({:.1}, {:.1}) -> ({:.1}, {:.1})",
            landmark,
            old.x,
            old.y,
            new.x,
            new.y
        );
        self.history.push(LandmarkEdit { landmark, old, new });
        Ok(&self.current)
    }

    /// Revert the most recent edit. Returns the landmark restored.
    pub fn undo(&mut self) -> Option<BodyLandmark> {
        let edit = self.history.pop_undo()?;
        self.current.set(edit.landmark, edit.old);
        Some(edit.landmark)
    }

    /// Re-apply the most recently undone edit. Returns the landmark changed.
    pub fn redo(&mut self) -> Option<BodyLandmark> {
        let edit = self.history.pop_redo()?;
        self.current.set(edit.landmark, edit.new);
        Some(edit.landmark)
    }

    /// Landmarks that now differ from the pose engine output.
    pub fn edited(&self) -> Vec<BodyLandmark> {
        self.current.diff(&self.original)
    }

    pub fn has_edits(&self) -> bool {
        self.current != self.original
    }

    /// Close the review and return the corrected set.
    ///
    /// Calling it again without further edits returns the same set.
    pub fn finalize(&mut self) -> BodyLandmarkSet {
        if self.state != ReviewState::Finalized {
            log::info!(
                "Finalized landmark review for '{}' ({} corrected)",
                self.input_image_id,
                self.edited().len()
            );
        }
        self.state = ReviewState::Finalized;
        self.current
    }
}

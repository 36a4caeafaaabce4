//! Error types for the calibration and correction workflow.

use thiserror::Error;

use crate::model::ReferenceTarget;
use crate::transport::{ServiceCall, TransportError};

/// Errors raised by the workflow core.
///
/// Every variant except [`GkatError::Transport`] is a local validation failure:
/// the operation that produced it made no observable change.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GkatError {
    /// The image orientation was never declared (neither face-on nor DTL).
    #[error("Invalid orientation for {step}: image must be face-on or down-the-line")]
    InvalidOrientation {
        /// Workflow step that needed the orientation
        step: &'static str,
    },

    /// A reference pick was requested while another pick is still open.
    #[error("Cannot pick {requested}: already picking {active}")]
    PickAlreadyInProgress {
        /// Target currently awaiting a click
        active: ReferenceTarget,
        /// Target the caller tried to start
        requested: ReferenceTarget,
    },

    /// A candidate was submitted with no pick in progress.
    #[error("No active pick: choose golf ball, club butt or club head first")]
    NoActivePick,

    /// Calibration was attempted before every reference mark was placed.
    #[error("Incomplete reference marks: missing {}", format_targets(.missing))]
    IncompleteReferenceMarks {
        /// Marks that still need to be picked
        missing: Vec<ReferenceTarget>,
    },

    /// The pose engine output does not have the body-25 shape.
    #[error("Malformed pose data: expected {expected} keypoints, found {found}")]
    MalformedPoseData {
        /// Number of entries required
        expected: usize,
        /// Number of entries received
        found: usize,
    },

    /// A landmark name outside the body-25 layout.
    #[error("Unknown landmark name '{name}'")]
    UnknownLandmarkName {
        /// The name that failed to resolve
        name: String,
    },

    /// A correction review was started while another is still open.
    #[error("Correction session already active for image '{input_image_id}'")]
    SessionAlreadyActive {
        /// Image whose landmarks are under review (empty when detached)
        input_image_id: String,
    },

    /// New keypoints would replace corrections that were never stored.
    #[error(
        "Image '{input_image_id}' has {edited} unsaved landmark corrections: submit or discard them first"
    )]
    UnsavedCorrections {
        /// Image whose corrections would be lost
        input_image_id: String,
        /// Number of landmarks that differ from the engine output
        edited: usize,
    },

    /// A vanishing point calibration image was supplied for a non-DTL image.
    #[error("Vanishing point calibration image is only used for down-the-line images")]
    VanishingPointRequiresDtl,

    /// Image bytes could not be decoded.
    #[error("Failed to decode {what}: {message}")]
    ImageDecode {
        /// Which image failed (input, axes calibration, ...)
        what: &'static str,
        /// Decoder message
        message: String,
    },

    /// Corrections were requested before keypoints were calculated or read.
    #[error("No body keypoints available for image '{input_image_id}': calculate them first")]
    KeypointsNotCalculated {
        /// The image in question
        input_image_id: String,
    },

    /// A service call failed; the transport error is passed through untouched.
    #[error("{call} failed: {source}")]
    Transport {
        /// Which service call failed
        call: ServiceCall,
        /// The error reported by the transport
        #[source]
        source: TransportError,
    },
}

impl GkatError {
    /// Create an invalid orientation error for a workflow step.
    pub fn invalid_orientation(step: &'static str) -> Self {
        Self::InvalidOrientation { step }
    }

    /// Create an unknown landmark name error.
    pub fn unknown_landmark(name: impl Into<String>) -> Self {
        Self::UnknownLandmarkName { name: name.into() }
    }

    /// Create a malformed pose data error for a wrong entry count.
    pub fn malformed_pose(expected: usize, found: usize) -> Self {
        Self::MalformedPoseData { expected, found }
    }

    /// Create an image decode error.
    pub fn image_decode(what: &'static str, message: impl ToString) -> Self {
        Self::ImageDecode {
            what,
            message: message.to_string(),
        }
    }

    /// Wrap a transport failure with the call that produced it.
    pub fn transport(call: ServiceCall, source: TransportError) -> Self {
        Self::Transport { call, source }
    }

    /// The underlying transport error, if this failure came from a service call.
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            Self::Transport { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn format_targets(targets: &[ReferenceTarget]) -> String {
    targets
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result alias for workflow operations.
pub type Result<T> = std::result::Result<T, GkatError>;

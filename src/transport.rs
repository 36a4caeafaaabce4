//! Boundary with the keypoints service.
//!
//! The service itself (its wire protocol, storage and pose engine) lives
//! elsewhere. This module defines what the workflow needs from it and how its
//! failures are reported. Failures are passed through unchanged and never retried.

use std::fmt;

use thiserror::Error;

use crate::calibration::CalibrationRequest;
use crate::model::{CalibrationStrategy, FeetLineMethod, ImageOrientation};
use crate::pose::BodyLandmarkSet;

/// Status codes a service call can fail with (the gRPC status set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl StatusCode {
    /// Map a numeric wire code. Codes outside the known range become `Unknown`.
    pub fn from_i32(code: i32) -> Self {
        match code {
            0 => StatusCode::Ok,
            1 => StatusCode::Cancelled,
            3 => StatusCode::InvalidArgument,
            4 => StatusCode::DeadlineExceeded,
            5 => StatusCode::NotFound,
            6 => StatusCode::AlreadyExists,
            7 => StatusCode::PermissionDenied,
            8 => StatusCode::ResourceExhausted,
            9 => StatusCode::FailedPrecondition,
            10 => StatusCode::Aborted,
            11 => StatusCode::OutOfRange,
            12 => StatusCode::Unimplemented,
            13 => StatusCode::Internal,
            14 => StatusCode::Unavailable,
            15 => StatusCode::DataLoss,
            16 => StatusCode::Unauthenticated,
            _ => StatusCode::Unknown,
        }
    }

    pub fn as_i32(&self) -> i32 {
        match self {
            StatusCode::Ok => 0,
            StatusCode::Cancelled => 1,
            StatusCode::Unknown => 2,
            StatusCode::InvalidArgument => 3,
            StatusCode::DeadlineExceeded => 4,
            StatusCode::NotFound => 5,
            StatusCode::AlreadyExists => 6,
            StatusCode::PermissionDenied => 7,
            StatusCode::ResourceExhausted => 8,
            StatusCode::FailedPrecondition => 9,
            StatusCode::Aborted => 10,
            StatusCode::OutOfRange => 11,
            StatusCode::Unimplemented => 12,
            StatusCode::Internal => 13,
            StatusCode::Unavailable => 14,
            StatusCode::DataLoss => 15,
            StatusCode::Unauthenticated => 16,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A failed service call, as reported by the transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct TransportError {
    pub code: StatusCode,
    pub message: String,
}

impl TransportError {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Result of a single service call.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Names of the service calls, for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceCall {
    UploadInputImage,
    ListInputImages,
    ReadInputImage,
    DeleteInputImage,
    CalibrateInputImage,
    CalculateGolfKeypoints,
    ReadGolfKeypoints,
    UpdateBodyKeypoints,
    DeleteGolfKeypoints,
}

impl fmt::Display for ServiceCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Session token obtained from the user service at login.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Acknowledgement returned by calls that produce no data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ack {
    /// Free-form message from the service, if any.
    pub message: String,
}

/// An input image as stored by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredInputImage {
    pub orientation: ImageOrientation,
    pub image: Vec<u8>,
    /// Strategy of the last calibration, or `None` if never calibrated.
    pub calibration: Option<CalibrationStrategy>,
    pub feet_line_method: FeetLineMethod,
}

/// Keypoints computed for an input image.
#[derive(Debug, Clone, PartialEq)]
pub struct GolfKeypoints {
    /// Input image with the detected skeleton drawn on it.
    pub output_image: Vec<u8>,
    pub body_keypoints: BodyLandmarkSet,
}

/// What the workflow needs from the keypoints service.
///
/// Calls are blocking from the caller's point of view. Implementations own
/// transport concerns such as connections, timeouts and retry policy.
pub trait KeypointsService {
    /// Store a new input image. Returns its id.
    fn upload_input_image(
        &mut self,
        token: &SessionToken,
        orientation: ImageOrientation,
        image: &[u8],
    ) -> TransportResult<String>;

    /// Ids of every input image the session's user has uploaded.
    fn list_input_images(&mut self, token: &SessionToken) -> TransportResult<Vec<String>>;

    /// Fetch a stored input image with its calibration settings.
    fn read_input_image(
        &mut self,
        token: &SessionToken,
        input_image_id: &str,
    ) -> TransportResult<StoredInputImage>;

    /// Remove an input image together with everything derived from it.
    fn delete_input_image(
        &mut self,
        token: &SessionToken,
        input_image_id: &str,
    ) -> TransportResult<Ack>;

    /// Calibrate a stored input image.
    fn calibrate_input_image(
        &mut self,
        token: &SessionToken,
        request: &CalibrationRequest,
    ) -> TransportResult<Ack>;

    /// Run pose estimation on a calibrated image.
    fn calculate_golf_keypoints(
        &mut self,
        token: &SessionToken,
        input_image_id: &str,
    ) -> TransportResult<GolfKeypoints>;

    /// Fetch keypoints computed earlier, without recomputing them.
    fn read_golf_keypoints(
        &mut self,
        token: &SessionToken,
        input_image_id: &str,
    ) -> TransportResult<GolfKeypoints>;

    /// Replace the stored body keypoints with corrected ones.
    fn update_body_keypoints(
        &mut self,
        token: &SessionToken,
        input_image_id: &str,
        body_keypoints: &BodyLandmarkSet,
    ) -> TransportResult<Ack>;

    /// Remove the stored keypoints of an image, keeping the image.
    fn delete_golf_keypoints(
        &mut self,
        token: &SessionToken,
        input_image_id: &str,
    ) -> TransportResult<Ack>;
}

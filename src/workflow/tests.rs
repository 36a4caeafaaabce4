//! Workflow tests against an in-memory keypoints service.

use super::*;
use crate::model::{BodyLandmark, Keypoint};
use crate::picker::Candidate;
use crate::preview::tests::png_bytes;
use crate::transport::{StatusCode, StoredInputImage, TransportError, TransportResult};

/// Records every call and answers from canned data.
#[derive(Default)]
struct StubService {
    calls: Vec<ServiceCall>,
    fail: Option<(ServiceCall, StatusCode)>,
    images: Vec<(String, ImageOrientation, Vec<u8>)>,
    calibrations: Vec<CalibrationRequest>,
    stored: Option<BodyLandmarkSet>,
}

impl StubService {
    fn failing(call: ServiceCall, code: StatusCode) -> Self {
        Self {
            fail: Some((call, code)),
            ..Self::default()
        }
    }

    fn record(&mut self, call: ServiceCall) -> TransportResult<()> {
        self.calls.push(call);
        match self.fail {
            Some((failing, code)) if failing == call => {
                Err(TransportError::new(code, format!("{} refused", call)))
            }
            _ => Ok(()),
        }
    }

    fn keypoints() -> GolfKeypoints {
        let mut entries = vec![(100.0, 200.0, 0.9); 25];
        entries[BodyLandmark::LEar.index()] = (0.0, 0.0, 0.0);
        entries[BodyLandmark::RHeel.index()] = (300.0, 900.0, 0.2);
        GolfKeypoints {
            output_image: vec![1, 2, 3],
            body_keypoints: BodyLandmarkSet::from_flat_array(&entries).unwrap(),
        }
    }
}

impl KeypointsService for StubService {
    fn upload_input_image(
        &mut self,
        _token: &SessionToken,
        orientation: ImageOrientation,
        image: &[u8],
    ) -> TransportResult<String> {
        self.record(ServiceCall::UploadInputImage)?;
        let id = format!("{}-image-{}", orientation.name(), self.images.len() + 1);
        self.images.push((id.clone(), orientation, image.to_vec()));
        Ok(id)
    }

    fn list_input_images(&mut self, _token: &SessionToken) -> TransportResult<Vec<String>> {
        self.record(ServiceCall::ListInputImages)?;
        Ok(self.images.iter().map(|(id, _, _)| id.clone()).collect())
    }

    fn read_input_image(
        &mut self,
        _token: &SessionToken,
        input_image_id: &str,
    ) -> TransportResult<StoredInputImage> {
        self.record(ServiceCall::ReadInputImage)?;
        let (_, orientation, image) = self
            .images
            .iter()
            .find(|(id, _, _)| id == input_image_id)
            .ok_or_else(|| TransportError::new(StatusCode::NotFound, "no such image"))?;
        let calibration = self
            .calibrations
            .iter()
            .rev()
            .find(|request| request.input_image_id == input_image_id);
        Ok(StoredInputImage {
            orientation: *orientation,
            image: image.clone(),
            calibration: calibration.map(|request| request.strategy),
            feet_line_method: calibration
                .map(|request| request.feet_line_method)
                .unwrap_or_default(),
        })
    }

    fn delete_input_image(
        &mut self,
        _token: &SessionToken,
        input_image_id: &str,
    ) -> TransportResult<Ack> {
        self.record(ServiceCall::DeleteInputImage)?;
        self.images.retain(|(id, _, _)| id != input_image_id);
        Ok(Ack::default())
    }

    fn calibrate_input_image(
        &mut self,
        _token: &SessionToken,
        request: &CalibrationRequest,
    ) -> TransportResult<Ack> {
        self.record(ServiceCall::CalibrateInputImage)?;
        self.calibrations.push(request.clone());
        Ok(Ack {
            message: "calibrated".to_string(),
        })
    }

    fn calculate_golf_keypoints(
        &mut self,
        _token: &SessionToken,
        _input_image_id: &str,
    ) -> TransportResult<GolfKeypoints> {
        self.record(ServiceCall::CalculateGolfKeypoints)?;
        Ok(Self::keypoints())
    }

    fn read_golf_keypoints(
        &mut self,
        _token: &SessionToken,
        _input_image_id: &str,
    ) -> TransportResult<GolfKeypoints> {
        self.record(ServiceCall::ReadGolfKeypoints)?;
        let mut keypoints = Self::keypoints();
        if let Some(stored) = self.stored {
            keypoints.body_keypoints = stored;
        }
        Ok(keypoints)
    }

    fn update_body_keypoints(
        &mut self,
        _token: &SessionToken,
        _input_image_id: &str,
        body_keypoints: &BodyLandmarkSet,
    ) -> TransportResult<Ack> {
        self.record(ServiceCall::UpdateBodyKeypoints)?;
        self.stored = Some(*body_keypoints);
        Ok(Ack::default())
    }

    fn delete_golf_keypoints(
        &mut self,
        _token: &SessionToken,
        _input_image_id: &str,
    ) -> TransportResult<Ack> {
        self.record(ServiceCall::DeleteGolfKeypoints)?;
        self.stored = None;
        Ok(Ack::default())
    }
}

fn token() -> SessionToken {
    SessionToken::new("token-abc")
}

fn dtl_session(service: &mut StubService) -> ImageSession {
    ImageSession::upload(
        service,
        token(),
        ImageOrientation::Dtl,
        &png_bytes(8, 8),
        &AppConfig::default(),
    )
    .unwrap()
}

fn accept_all(_: &Candidate) -> bool {
    true
}

fn pick_all(session: &mut ImageSession) {
    let clicks = [
        (ReferenceTarget::GolfBall, 10.0, 20.0),
        (ReferenceTarget::ClubButt, 30.0, 40.0),
        (ReferenceTarget::ClubHead, 50.0, 60.0),
    ];
    for (target, x, y) in clicks {
        session.begin_pick(target).unwrap();
        let outcome = session.submit_candidate(x, y, &mut accept_all).unwrap();
        assert!(matches!(outcome, PickOutcome::Accepted(_)));
    }
}

// ============================================================================
// Upload
// ============================================================================

#[test]
fn test_upload_returns_session_for_new_image() {
    let mut service = StubService::default();
    let session = dtl_session(&mut service);

    assert_eq!(session.input_image_id(), "down-the-line-image-1");
    assert_eq!(session.orientation(), ImageOrientation::Dtl);
    assert_eq!(session.display_scale(), DisplayScale::new(4.0));
    assert_eq!(session.feet_line_method(), FeetLineMethod::UseHeelLine);
    assert_eq!(service.calls, vec![ServiceCall::UploadInputImage]);
}

#[test]
fn test_upload_rejects_unspecified_orientation() {
    let mut service = StubService::default();
    let result = ImageSession::upload(
        &mut service,
        token(),
        ImageOrientation::Unspecified,
        &png_bytes(8, 8),
        &AppConfig::default(),
    );

    assert!(matches!(result, Err(GkatError::InvalidOrientation { .. })));
    assert!(service.calls.is_empty());
}

#[test]
fn test_upload_fit_to_canvas_decodes_before_sending() {
    let mut config = AppConfig::default();
    config.preview.fit_to_canvas = true;

    let mut service = StubService::default();
    let result = ImageSession::upload(
        &mut service,
        token(),
        ImageOrientation::FaceOn,
        b"not an image",
        &config,
    );
    assert!(matches!(result, Err(GkatError::ImageDecode { .. })));
    assert!(service.calls.is_empty());

    let session = ImageSession::upload(
        &mut service,
        token(),
        ImageOrientation::FaceOn,
        &png_bytes(540, 1200),
        &config,
    )
    .unwrap();
    assert_eq!(session.display_scale().downscale, 2.0);
}

#[test]
fn test_upload_failure_passes_status_through() {
    let mut service = StubService::failing(ServiceCall::UploadInputImage, StatusCode::Unavailable);
    let err = ImageSession::upload(
        &mut service,
        token(),
        ImageOrientation::Dtl,
        &png_bytes(8, 8),
        &AppConfig::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        GkatError::Transport {
            call: ServiceCall::UploadInputImage,
            ..
        }
    ));
    assert_eq!(
        err.transport_error().map(|e| e.code),
        Some(StatusCode::Unavailable)
    );
}

// ============================================================================
// Calibration
// ============================================================================

#[test]
fn test_dtl_axes_only_calibration_end_to_end() {
    let mut service = StubService::default();
    let mut session = dtl_session(&mut service);

    session.set_axes_image(vec![7; 16]);
    assert_eq!(
        session.calibration_strategy(),
        Ok(CalibrationStrategy::AxesOnly)
    );

    // Two marks are not enough.
    session.begin_pick(ReferenceTarget::GolfBall).unwrap();
    session.submit_candidate(10.0, 20.0, &mut accept_all).unwrap();
    session.begin_pick(ReferenceTarget::ClubButt).unwrap();
    session.submit_candidate(30.0, 40.0, &mut accept_all).unwrap();

    let err = session.calibrate(&mut service).unwrap_err();
    assert_eq!(
        err,
        GkatError::IncompleteReferenceMarks {
            missing: vec![ReferenceTarget::ClubHead]
        }
    );
    assert!(session.calibration_images().has_axes_image());
    assert_eq!(service.calls, vec![ServiceCall::UploadInputImage]);

    session.begin_pick(ReferenceTarget::ClubHead).unwrap();
    session.submit_candidate(50.0, 60.0, &mut accept_all).unwrap();

    let ack = session.calibrate(&mut service).unwrap();
    assert_eq!(ack.message, "calibrated");
    assert_eq!(session.calibration(), Some(CalibrationStrategy::AxesOnly));
    assert!(session.calibration_images().is_empty());

    let request = &service.calibrations[0];
    assert_eq!(request.input_image_id, "down-the-line-image-1");
    assert_eq!(request.strategy, CalibrationStrategy::AxesOnly);
    assert_eq!(request.reference_marks.golf_ball, Keypoint::manual(40.0, 80.0));
    assert_eq!(request.reference_marks.club_head, Keypoint::manual(200.0, 240.0));
    assert_eq!(request.calibration_images.axes_image(), Some(&[7u8; 16][..]));
    assert_eq!(request.calibration_images.vanishing_point_image(), None);
}

#[test]
fn test_calibration_options_reach_request() {
    let mut service = StubService::default();
    let mut session = dtl_session(&mut service);
    pick_all(&mut session);

    session.set_feet_line_method(FeetLineMethod::UseToeLine);
    session.set_shoulder_tilt(12.5);
    session.calibrate(&mut service).unwrap();

    let request = &service.calibrations[0];
    assert_eq!(request.strategy, CalibrationStrategy::NoCalibration);
    assert_eq!(request.feet_line_method, FeetLineMethod::UseToeLine);
    assert_eq!(request.shoulder_tilt, ShoulderTilt::measured(12.5));
}

#[test]
fn test_default_shoulder_tilt_carries_warning() {
    let mut service = StubService::default();
    let mut session = dtl_session(&mut service);
    pick_all(&mut session);
    session.calibrate(&mut service).unwrap();

    let tilt = &service.calibrations[0].shoulder_tilt;
    assert_eq!(tilt.value, 0.0);
    assert!(tilt.warning.is_some());
}

#[test]
fn test_face_on_rejects_vanishing_point_image() {
    let mut service = StubService::default();
    let mut session = ImageSession::upload(
        &mut service,
        token(),
        ImageOrientation::FaceOn,
        &png_bytes(8, 8),
        &AppConfig::default(),
    )
    .unwrap();

    assert_eq!(
        session.set_vanishing_point_image(vec![1]),
        Err(GkatError::VanishingPointRequiresDtl)
    );
    session.set_axes_image(vec![1]);
    assert_eq!(
        session.calibration_strategy(),
        Ok(CalibrationStrategy::FullCalibration)
    );
}

#[test]
fn test_failed_calibration_keeps_images() {
    let mut service =
        StubService::failing(ServiceCall::CalibrateInputImage, StatusCode::FailedPrecondition);
    let mut session = dtl_session(&mut service);
    session.set_axes_image(vec![1]);
    session.set_vanishing_point_image(vec![2]).unwrap();
    pick_all(&mut session);

    let err = session.calibrate(&mut service).unwrap_err();
    assert_eq!(
        err.transport_error().map(|e| e.code),
        Some(StatusCode::FailedPrecondition)
    );
    assert_eq!(session.calibration(), None);
    assert_eq!(
        session.calibration_strategy(),
        Ok(CalibrationStrategy::FullCalibration)
    );
}

// ============================================================================
// Keypoints and review
// ============================================================================

#[test]
fn test_review_before_keypoints_is_rejected() {
    let mut service = StubService::default();
    let mut session = dtl_session(&mut service);

    assert!(matches!(
        session.start_review(),
        Err(GkatError::KeypointsNotCalculated { .. })
    ));
    assert!(matches!(
        session.submit_corrections(&mut service),
        Err(GkatError::KeypointsNotCalculated { .. })
    ));
    assert!(session.landmark_warnings().is_empty());
}

#[test]
fn test_calculate_keypoints_opens_review() {
    let mut service = StubService::default();
    let mut session = dtl_session(&mut service);

    let set = *session.calculate_keypoints(&mut service).unwrap();
    assert_eq!(set[BodyLandmark::Nose], Keypoint::new(100.0, 200.0, 0.9));
    assert_eq!(session.output_image(), Some(&[1u8, 2, 3][..]));

    let warnings = session.landmark_warnings();
    let flagged: Vec<BodyLandmark> = warnings.iter().map(|w| w.landmark).collect();
    assert_eq!(flagged, vec![BodyLandmark::LEar, BodyLandmark::RHeel]);

    let queue = session.start_review().unwrap();
    assert_eq!(queue.len(), 25);
}

#[test]
fn test_recalculate_during_review_is_rejected() {
    let mut service = StubService::default();
    let mut session = dtl_session(&mut service);
    session.calculate_keypoints(&mut service).unwrap();
    session.start_review().unwrap();

    assert!(matches!(
        session.calculate_keypoints(&mut service),
        Err(GkatError::SessionAlreadyActive { .. })
    ));
    assert!(matches!(
        session.start_review(),
        Err(GkatError::SessionAlreadyActive { .. })
    ));
}

#[test]
fn test_submit_corrections_stores_finalized_set() {
    let mut service = StubService::default();
    let mut session = dtl_session(&mut service);
    session.calculate_keypoints(&mut service).unwrap();
    session.start_review().unwrap();

    session.apply_edit("LEar", 120.0, 180.0).unwrap();
    session.submit_corrections(&mut service).unwrap();

    let stored = service.stored.expect("keypoints were not stored");
    assert_eq!(stored[BodyLandmark::LEar], Keypoint::manual(120.0, 180.0));
    assert_eq!(stored[BodyLandmark::Nose], Keypoint::new(100.0, 200.0, 0.9));
    assert_eq!(
        session.correction().map(|c| c.state()),
        Some(ReviewState::Finalized)
    );
}

#[test]
fn test_reload_reads_stored_keypoints() {
    let mut service = StubService::default();
    let mut session = dtl_session(&mut service);
    session.calculate_keypoints(&mut service).unwrap();
    session.start_review().unwrap();
    session.apply_edit("RHeel", 310.0, 905.0).unwrap();
    session.submit_corrections(&mut service).unwrap();

    let reloaded = *session.reload_keypoints(&mut service).unwrap();
    assert_eq!(reloaded[BodyLandmark::RHeel], Keypoint::manual(310.0, 905.0));
    assert_eq!(service.calls.last(), Some(&ServiceCall::ReadGolfKeypoints));
}

#[test]
fn test_discard_corrections_restores_calculated_set() {
    let mut service = StubService::default();
    let mut session = dtl_session(&mut service);
    session.calculate_keypoints(&mut service).unwrap();
    session.start_review().unwrap();
    session.apply_edit("Nose", 1.0, 1.0).unwrap();

    session.discard_corrections().unwrap();
    let correction = session.correction().unwrap();
    assert_eq!(correction.state(), ReviewState::Pending);
    assert!(!correction.has_edits());
    assert_eq!(correction.current(), correction.original());
}

#[test]
fn test_failed_update_leaves_review_finalized() {
    let mut service =
        StubService::failing(ServiceCall::UpdateBodyKeypoints, StatusCode::DeadlineExceeded);
    let mut session = dtl_session(&mut service);
    session.calculate_keypoints(&mut service).unwrap();
    session.start_review().unwrap();

    let err = session.submit_corrections(&mut service).unwrap_err();
    assert!(matches!(
        err,
        GkatError::Transport {
            call: ServiceCall::UpdateBodyKeypoints,
            ..
        }
    ));

    // Finalized sets can be resubmitted.
    service.fail = None;
    session.submit_corrections(&mut service).unwrap();
    assert!(service.stored.is_some());
}

#[test]
fn test_pending_edits_block_new_keypoints() {
    let mut service = StubService::default();
    let mut session = dtl_session(&mut service);
    session.calculate_keypoints(&mut service).unwrap();

    // Edited without opening a review pass.
    session.apply_edit("Nose", 1.0, 1.0).unwrap();
    assert!(session.has_unsaved_corrections());

    assert_eq!(
        session.calculate_keypoints(&mut service).unwrap_err(),
        GkatError::UnsavedCorrections {
            input_image_id: "down-the-line-image-1".to_string(),
            edited: 1,
        }
    );
    assert!(matches!(
        session.reload_keypoints(&mut service),
        Err(GkatError::UnsavedCorrections { .. })
    ));
    let current = session.correction().unwrap().current();
    assert_eq!(current[BodyLandmark::Nose], Keypoint::manual(1.0, 1.0));

    session.discard_corrections().unwrap();
    assert!(!session.has_unsaved_corrections());
    session.calculate_keypoints(&mut service).unwrap();
}

#[test]
fn test_failed_update_keeps_corrections() {
    let mut service =
        StubService::failing(ServiceCall::UpdateBodyKeypoints, StatusCode::Unavailable);
    let mut session = dtl_session(&mut service);
    session.calculate_keypoints(&mut service).unwrap();
    session.start_review().unwrap();
    session.apply_edit("Nose", 1.0, 1.0).unwrap();
    assert!(session.submit_corrections(&mut service).is_err());

    assert!(matches!(
        session.reload_keypoints(&mut service),
        Err(GkatError::UnsavedCorrections { edited: 1, .. })
    ));
    let current = session.correction().unwrap().current();
    assert_eq!(current[BodyLandmark::Nose], Keypoint::manual(1.0, 1.0));

    service.fail = None;
    session.submit_corrections(&mut service).unwrap();
    assert!(!session.has_unsaved_corrections());
    let reloaded = *session.reload_keypoints(&mut service).unwrap();
    assert_eq!(reloaded[BodyLandmark::Nose], Keypoint::manual(1.0, 1.0));
}

#[test]
fn test_delete_keypoints_drops_review() {
    let mut service = StubService::default();
    let mut session = dtl_session(&mut service);
    session.calculate_keypoints(&mut service).unwrap();
    session.start_review().unwrap();
    session.apply_edit("Neck", 5.0, 5.0).unwrap();

    session.delete_keypoints(&mut service).unwrap();
    assert!(session.correction().is_none());
    assert_eq!(session.output_image(), None);
    assert!(!session.has_unsaved_corrections());
    assert!(matches!(
        session.start_review(),
        Err(GkatError::KeypointsNotCalculated { .. })
    ));
    assert_eq!(service.calls.last(), Some(&ServiceCall::DeleteGolfKeypoints));
}

// ============================================================================
// Stored images
// ============================================================================

#[test]
fn test_list_and_reopen_stored_image() {
    let mut service = StubService::default();
    let png = png_bytes(8, 8);
    let mut dtl = dtl_session(&mut service);
    ImageSession::upload(
        &mut service,
        token(),
        ImageOrientation::FaceOn,
        &png,
        &AppConfig::default(),
    )
    .unwrap();

    pick_all(&mut dtl);
    dtl.set_feet_line_method(FeetLineMethod::UseToeLine);
    dtl.calibrate(&mut service).unwrap();

    let ids = list_input_images(&mut service, &token()).unwrap();
    assert_eq!(ids, vec!["down-the-line-image-1", "face-on-image-2"]);

    let reopened =
        ImageSession::open(&mut service, token(), &ids[0], &AppConfig::default()).unwrap();
    assert_eq!(reopened.input_image_id(), "down-the-line-image-1");
    assert_eq!(reopened.orientation(), ImageOrientation::Dtl);
    assert_eq!(reopened.input_image(), &png[..]);
    assert_eq!(reopened.display_scale(), DisplayScale::new(4.0));
    assert_eq!(reopened.calibration(), Some(CalibrationStrategy::NoCalibration));
    assert_eq!(reopened.feet_line_method(), FeetLineMethod::UseToeLine);

    let face_on =
        ImageSession::open(&mut service, token(), &ids[1], &AppConfig::default()).unwrap();
    assert_eq!(face_on.calibration(), None);
    assert_eq!(face_on.feet_line_method(), FeetLineMethod::UseHeelLine);
}

#[test]
fn test_open_unknown_image_passes_not_found() {
    let mut service = StubService::default();
    let err = ImageSession::open(&mut service, token(), "missing", &AppConfig::default())
        .unwrap_err();

    assert!(matches!(
        err,
        GkatError::Transport {
            call: ServiceCall::ReadInputImage,
            ..
        }
    ));
    assert_eq!(
        err.transport_error().map(|e| e.code),
        Some(StatusCode::NotFound)
    );
}

#[test]
fn test_list_failure_passes_status_through() {
    let mut service =
        StubService::failing(ServiceCall::ListInputImages, StatusCode::Unauthenticated);
    let err = list_input_images(&mut service, &token()).unwrap_err();
    assert_eq!(
        err.transport_error().map(|e| e.code),
        Some(StatusCode::Unauthenticated)
    );
}

#[test]
fn test_delete_input_image() {
    let mut service = StubService::default();
    let session = dtl_session(&mut service);

    session.delete(&mut service).unwrap();
    assert!(list_input_images(&mut service, &token()).unwrap().is_empty());
}

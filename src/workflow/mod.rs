//! Per-image calibration and correction workflow.
//!
//! An [`ImageSession`] holds everything the user builds up for one uploaded
//! swing image: calibration images, reference marks, calibration options and
//! the landmark review. One session exists per in-flight image; service calls
//! go through the [`KeypointsService`] passed to each step. Images uploaded
//! earlier are found with [`list_input_images`] and reopened with
//! [`ImageSession::open`].

use crate::calibration::{CalibrationImageSet, CalibrationRequest};
use crate::config::AppConfig;
use crate::coordinate::DisplayScale;
use crate::correction::{CorrectionSession, ReviewQueue, ReviewState};
use crate::error::{GkatError, Result};
use crate::model::{
    CalibrationStrategy, FeetLineMethod, ImageOrientation, ReferenceMarks, ReferenceTarget,
    ShoulderTilt,
};
use crate::picker::{ConfirmCandidate, KeypointPicker, PickOutcome, PickState};
use crate::pose::{BodyLandmarkSet, LandmarkWarning};
use crate::transport::{Ack, GolfKeypoints, KeypointsService, ServiceCall, SessionToken};

#[cfg(test)]
mod tests;

/// Settings an image session takes from the application configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub confidence_threshold: f64,
    pub undo_history: usize,
    pub feet_line_method: FeetLineMethod,
}

impl From<&AppConfig> for SessionSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            confidence_threshold: config.preferences.confidence_threshold,
            undo_history: config.preferences.undo_history,
            feet_line_method: config.preferences.feet_line_method,
        }
    }
}

/// Ids of the input images the logged-in user has uploaded.
pub fn list_input_images<S: KeypointsService + ?Sized>(
    service: &mut S,
    token: &SessionToken,
) -> Result<Vec<String>> {
    let ids = service
        .list_input_images(token)
        .map_err(|e| GkatError::transport(ServiceCall::ListInputImages, e))?;
    log::debug!("Found {} stored input images", ids.len());
    Ok(ids)
}

/// Workflow state for one uploaded input image.
#[derive(Debug, Clone)]
pub struct ImageSession {
    token: SessionToken,
    input_image_id: String,
    orientation: ImageOrientation,
    input_image: Vec<u8>,
    calibration_images: CalibrationImageSet,
    picker: KeypointPicker,
    feet_line_method: FeetLineMethod,
    shoulder_tilt: ShoulderTilt,
    calibration: Option<CalibrationStrategy>,
    output_image: Option<Vec<u8>>,
    correction: Option<CorrectionSession>,
    /// Last landmark set the service accepted from this session.
    stored: Option<BodyLandmarkSet>,
    settings: SessionSettings,
}

impl ImageSession {
    /// Upload a new input image and open a session for it.
    ///
    /// The preview scale is chosen from the configuration before anything is
    /// sent, so an undecodable image never reaches the service.
    pub fn upload<S: KeypointsService + ?Sized>(
        service: &mut S,
        token: SessionToken,
        orientation: ImageOrientation,
        image: &[u8],
        config: &AppConfig,
    ) -> Result<Self> {
        if !orientation.is_specified() {
            return Err(GkatError::invalid_orientation("upload"));
        }
        let scale = config.preview.scaling().scale_for(image)?;

        let input_image_id = service
            .upload_input_image(&token, orientation, image)
            .map_err(|e| {
                log::warn!("Upload of {} byte image failed: {}", image.len(), e);
                GkatError::transport(ServiceCall::UploadInputImage, e)
            })?;
        log::info!("Uploaded {} image as '{}'", orientation, input_image_id);

        Ok(Self::new(
            token,
            input_image_id,
            orientation,
            image.to_vec(),
            scale,
            SessionSettings::from(config),
        ))
    }

    /// Reopen an image uploaded earlier, with its stored calibration settings.
    pub fn open<S: KeypointsService + ?Sized>(
        service: &mut S,
        token: SessionToken,
        input_image_id: &str,
        config: &AppConfig,
    ) -> Result<Self> {
        let stored = service
            .read_input_image(&token, input_image_id)
            .map_err(|e| GkatError::transport(ServiceCall::ReadInputImage, e))?;
        if !stored.orientation.is_specified() {
            return Err(GkatError::invalid_orientation("open stored image"));
        }
        let scale = config.preview.scaling().scale_for(&stored.image)?;
        log::info!("Opened {} image '{}'", stored.orientation, input_image_id);

        let mut session = Self::new(
            token,
            input_image_id,
            stored.orientation,
            stored.image,
            scale,
            SessionSettings::from(config),
        );
        session.feet_line_method = stored.feet_line_method;
        session.calibration = stored.calibration;
        Ok(session)
    }

    fn new(
        token: SessionToken,
        input_image_id: impl Into<String>,
        orientation: ImageOrientation,
        input_image: Vec<u8>,
        scale: DisplayScale,
        settings: SessionSettings,
    ) -> Self {
        Self {
            token,
            input_image_id: input_image_id.into(),
            orientation,
            input_image,
            calibration_images: CalibrationImageSet::new(),
            picker: KeypointPicker::new(scale),
            feet_line_method: settings.feet_line_method,
            shoulder_tilt: ShoulderTilt::default(),
            calibration: None,
            output_image: None,
            correction: None,
            stored: None,
            settings,
        }
    }

    pub fn input_image_id(&self) -> &str {
        &self.input_image_id
    }

    pub fn orientation(&self) -> ImageOrientation {
        self.orientation
    }

    /// The uploaded photo, as encoded bytes.
    pub fn input_image(&self) -> &[u8] {
        &self.input_image
    }

    pub fn display_scale(&self) -> DisplayScale {
        self.picker.scale()
    }

    pub fn feet_line_method(&self) -> FeetLineMethod {
        self.feet_line_method
    }

    pub fn shoulder_tilt(&self) -> &ShoulderTilt {
        &self.shoulder_tilt
    }

    /// Strategy used by the last successful calibration.
    pub fn calibration(&self) -> Option<CalibrationStrategy> {
        self.calibration
    }

    /// Image with the detected skeleton drawn on it, once keypoints are calculated.
    pub fn output_image(&self) -> Option<&[u8]> {
        self.output_image.as_deref()
    }

    // ------------------------------------------------------------------------
    // Calibration inputs
    // ------------------------------------------------------------------------

    pub fn set_axes_image(&mut self, image: Vec<u8>) {
        self.calibration_images.set_axes_image(image);
    }

    /// Fails with `VanishingPointRequiresDtl` for face-on images.
    pub fn set_vanishing_point_image(&mut self, image: Vec<u8>) -> Result<()> {
        self.calibration_images
            .set_vanishing_point_image(self.orientation, image)
    }

    pub fn calibration_images(&self) -> &CalibrationImageSet {
        &self.calibration_images
    }

    pub fn set_feet_line_method(&mut self, method: FeetLineMethod) {
        self.feet_line_method = method;
    }

    /// Record a user-measured shoulder tilt, clearing the default warning.
    pub fn set_shoulder_tilt(&mut self, value: f64) {
        self.shoulder_tilt = ShoulderTilt::measured(value);
    }

    /// Strategy the current calibration images allow.
    pub fn calibration_strategy(&self) -> Result<CalibrationStrategy> {
        self.calibration_images.strategy(self.orientation)
    }

    // ------------------------------------------------------------------------
    // Reference marks
    // ------------------------------------------------------------------------

    pub fn pick_state(&self) -> PickState {
        self.picker.state()
    }

    pub fn reference_marks(&self) -> &ReferenceMarks {
        self.picker.marks()
    }

    pub fn begin_pick(&mut self, target: ReferenceTarget) -> Result<()> {
        self.picker.begin_pick(target)
    }

    pub fn submit_candidate(
        &mut self,
        display_x: f64,
        display_y: f64,
        confirm: &mut impl ConfirmCandidate,
    ) -> Result<PickOutcome> {
        self.picker.submit_candidate(display_x, display_y, confirm)
    }

    pub fn cancel_pick(&mut self) {
        self.picker.cancel();
    }

    // ------------------------------------------------------------------------
    // Service steps
    // ------------------------------------------------------------------------

    /// Send the calibration request for this image.
    ///
    /// Requires all three reference marks. The calibration images are consumed
    /// when the service accepts the request and kept when it fails.
    pub fn calibrate<S: KeypointsService + ?Sized>(&mut self, service: &mut S) -> Result<Ack> {
        let request = CalibrationRequest::build(
            self.input_image_id.clone(),
            self.orientation,
            self.picker.marks(),
            &mut self.calibration_images,
            self.feet_line_method,
            self.shoulder_tilt.clone(),
        )?;

        match service.calibrate_input_image(&self.token, &request) {
            Ok(ack) => {
                log::info!(
                    "Calibrated '{}' with {}",
                    self.input_image_id,
                    request.strategy
                );
                self.calibration = Some(request.strategy);
                Ok(ack)
            }
            Err(e) => {
                log::warn!("Calibration of '{}' failed: {}", self.input_image_id, e);
                self.calibration_images = request.calibration_images;
                Err(GkatError::transport(ServiceCall::CalibrateInputImage, e))
            }
        }
    }

    /// Run pose estimation and open a landmark review on the result.
    pub fn calculate_keypoints<S: KeypointsService + ?Sized>(
        &mut self,
        service: &mut S,
    ) -> Result<&BodyLandmarkSet> {
        self.ensure_keypoints_replaceable()?;
        let keypoints = service
            .calculate_golf_keypoints(&self.token, &self.input_image_id)
            .map_err(|e| GkatError::transport(ServiceCall::CalculateGolfKeypoints, e))?;
        log::info!("Calculated golf keypoints for '{}'", self.input_image_id);
        Ok(self.open_review(keypoints))
    }

    /// Fetch keypoints calculated earlier and open a landmark review on them.
    pub fn reload_keypoints<S: KeypointsService + ?Sized>(
        &mut self,
        service: &mut S,
    ) -> Result<&BodyLandmarkSet> {
        self.ensure_keypoints_replaceable()?;
        let keypoints = service
            .read_golf_keypoints(&self.token, &self.input_image_id)
            .map_err(|e| GkatError::transport(ServiceCall::ReadGolfKeypoints, e))?;
        log::info!("Read golf keypoints for '{}'", self.input_image_id);
        Ok(self.open_review(keypoints))
    }

    /// New keypoints may not replace an open review or unstored corrections.
    fn ensure_keypoints_replaceable(&self) -> Result<()> {
        let Some(session) = &self.correction else {
            return Ok(());
        };
        if session.state() == ReviewState::Reviewing {
            return Err(GkatError::SessionAlreadyActive {
                input_image_id: self.input_image_id.clone(),
            });
        }
        if self.has_unsaved_corrections() {
            return Err(GkatError::UnsavedCorrections {
                input_image_id: self.input_image_id.clone(),
                edited: session.edited().len(),
            });
        }
        Ok(())
    }

    fn open_review(&mut self, keypoints: GolfKeypoints) -> &BodyLandmarkSet {
        for warning in keypoints
            .body_keypoints
            .verify(self.settings.confidence_threshold)
        {
            log::warn!("{}: {}", self.input_image_id, warning);
        }
        self.output_image = Some(keypoints.output_image);
        self.stored = None;
        let session =
            CorrectionSession::for_image(self.input_image_id.clone(), keypoints.body_keypoints)
                .with_max_history(self.settings.undo_history);
        self.correction.insert(session).current()
    }

    // ------------------------------------------------------------------------
    // Landmark review
    // ------------------------------------------------------------------------

    pub fn correction(&self) -> Option<&CorrectionSession> {
        self.correction.as_ref()
    }

    fn correction_mut(&mut self) -> Result<&mut CorrectionSession> {
        let input_image_id = &self.input_image_id;
        self.correction
            .as_mut()
            .ok_or_else(|| GkatError::KeypointsNotCalculated {
                input_image_id: input_image_id.clone(),
            })
    }

    /// Whether corrections exist that the service has not accepted yet.
    pub fn has_unsaved_corrections(&self) -> bool {
        match &self.correction {
            Some(session) => {
                session.has_edits() && self.stored.as_ref() != Some(session.current())
            }
            None => false,
        }
    }

    /// Landmarks the user should double-check.
    pub fn landmark_warnings(&self) -> Vec<LandmarkWarning> {
        self.correction
            .as_ref()
            .map(|c| c.current().verify(self.settings.confidence_threshold))
            .unwrap_or_default()
    }

    pub fn start_review(&mut self) -> Result<ReviewQueue> {
        self.correction_mut()?.start()
    }

    pub fn apply_edit(&mut self, name: &str, x: f64, y: f64) -> Result<&BodyLandmarkSet> {
        self.correction_mut()?.apply_edit(name, x, y)
    }

    /// Throw away all corrections and start over from the calculated keypoints.
    pub fn discard_corrections(&mut self) -> Result<()> {
        let session = self.correction_mut()?;
        let fresh = CorrectionSession::for_image(session.input_image_id(), *session.original())
            .with_max_history(self.settings.undo_history);
        self.correction = Some(fresh);
        log::debug!("Discarded corrections for '{}'", self.input_image_id);
        Ok(())
    }

    /// Finalize the review and store the corrected keypoints.
    pub fn submit_corrections<S: KeypointsService + ?Sized>(
        &mut self,
        service: &mut S,
    ) -> Result<Ack> {
        let finalized = self.correction_mut()?.finalize();
        let ack = service
            .update_body_keypoints(&self.token, &self.input_image_id, &finalized)
            .map_err(|e| {
                log::warn!("Updating keypoints of '{}' failed: {}", self.input_image_id, e);
                GkatError::transport(ServiceCall::UpdateBodyKeypoints, e)
            })?;
        self.stored = Some(finalized);
        log::info!("Stored corrected keypoints for '{}'", self.input_image_id);
        Ok(ack)
    }

    /// Delete the stored keypoints, dropping the local review with them.
    pub fn delete_keypoints<S: KeypointsService + ?Sized>(
        &mut self,
        service: &mut S,
    ) -> Result<Ack> {
        let ack = service
            .delete_golf_keypoints(&self.token, &self.input_image_id)
            .map_err(|e| GkatError::transport(ServiceCall::DeleteGolfKeypoints, e))?;
        if let Some(session) = self.correction.take() {
            log::debug!(
                "Dropped review of '{}' ({} corrected)",
                self.input_image_id,
                session.edited().len()
            );
        }
        self.output_image = None;
        self.stored = None;
        log::info!("Deleted golf keypoints for '{}'", self.input_image_id);
        Ok(ack)
    }

    /// Delete the input image and everything derived from it.
    ///
    /// The session is consumed. If the call fails the image is still stored and
    /// can be reopened with [`ImageSession::open`].
    pub fn delete<S: KeypointsService + ?Sized>(self, service: &mut S) -> Result<Ack> {
        let ack = service
            .delete_input_image(&self.token, &self.input_image_id)
            .map_err(|e| GkatError::transport(ServiceCall::DeleteInputImage, e))?;
        log::info!("Deleted input image '{}'", self.input_image_id);
        Ok(ack)
    }
}

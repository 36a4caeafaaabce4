//! Calibration strategy selection and request assembly.

use crate::error::{GkatError, Result};
use crate::model::{
    CalibrationStrategy, CompleteReferenceMarks, FeetLineMethod, ImageOrientation, ReferenceMarks,
    ShoulderTilt,
};

/// Derive the calibration strategy for an image.
///
/// Face-on calibration needs no vanishing point, so an axes image alone gives
/// full calibration. Down-the-line images need both images for full calibration;
/// a vanishing point image without axes is not enough to calibrate at all.
pub fn classify(
    orientation: ImageOrientation,
    has_axes_image: bool,
    has_vanishing_point_image: bool,
) -> Result<CalibrationStrategy> {
    let strategy = match (orientation, has_axes_image, has_vanishing_point_image) {
        (ImageOrientation::Unspecified, _, _) => {
            return Err(GkatError::invalid_orientation("calibration"));
        }
        (ImageOrientation::FaceOn, true, _) => CalibrationStrategy::FullCalibration,
        (ImageOrientation::FaceOn, false, _) => CalibrationStrategy::NoCalibration,
        (ImageOrientation::Dtl, false, _) => CalibrationStrategy::NoCalibration,
        (ImageOrientation::Dtl, true, false) => CalibrationStrategy::AxesOnly,
        (ImageOrientation::Dtl, true, true) => CalibrationStrategy::FullCalibration,
    };
    log::trace!(
        "Classified {} image (axes: {}, vanishing point: {}) as {}",
        orientation,
        has_axes_image,
        has_vanishing_point_image,
        strategy
    );
    Ok(strategy)
}

/// Calibration images collected for one input image.
///
/// Filled in by the user one image at a time and consumed by [`CalibrationImageSet::take`]
/// when a calibration request is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationImageSet {
    axes_image: Option<Vec<u8>>,
    vanishing_point_image: Option<Vec<u8>>,
}

impl CalibrationImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace the axes calibration image.
    pub fn set_axes_image(&mut self, image: Vec<u8>) {
        log::debug!("Axes calibration image set ({} bytes)", image.len());
        self.axes_image = Some(image);
    }

    /// Set or replace the vanishing point calibration image.
    ///
    /// Only down-the-line images use a vanishing point; any other orientation is
    /// rejected and the set is left unchanged.
    pub fn set_vanishing_point_image(
        &mut self,
        orientation: ImageOrientation,
        image: Vec<u8>,
    ) -> Result<()> {
        match orientation {
            ImageOrientation::Dtl => {
                log::debug!("Vanishing point calibration image set ({} bytes)", image.len());
                self.vanishing_point_image = Some(image);
                Ok(())
            }
            ImageOrientation::FaceOn => Err(GkatError::VanishingPointRequiresDtl),
            ImageOrientation::Unspecified => {
                Err(GkatError::invalid_orientation("vanishing point calibration"))
            }
        }
    }

    /// The axes calibration image, if set.
    pub fn axes_image(&self) -> Option<&[u8]> {
        self.axes_image.as_deref()
    }

    /// The vanishing point calibration image, if set.
    pub fn vanishing_point_image(&self) -> Option<&[u8]> {
        self.vanishing_point_image.as_deref()
    }

    pub fn has_axes_image(&self) -> bool {
        self.axes_image.is_some()
    }

    pub fn has_vanishing_point_image(&self) -> bool {
        self.vanishing_point_image.is_some()
    }

    /// Strategy these images allow for an image of the given orientation.
    pub fn strategy(&self, orientation: ImageOrientation) -> Result<CalibrationStrategy> {
        classify(
            orientation,
            self.has_axes_image(),
            self.has_vanishing_point_image(),
        )
    }

    /// Move the images out, leaving the set empty.
    pub fn take(&mut self) -> CalibrationImageSet {
        std::mem::take(self)
    }

    pub fn is_empty(&self) -> bool {
        self.axes_image.is_none() && self.vanishing_point_image.is_none()
    }
}

/// Everything the keypoints service needs to calibrate an input image.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationRequest {
    pub input_image_id: String,
    pub strategy: CalibrationStrategy,
    pub reference_marks: CompleteReferenceMarks,
    pub calibration_images: CalibrationImageSet,
    pub feet_line_method: FeetLineMethod,
    pub shoulder_tilt: ShoulderTilt,
}

impl CalibrationRequest {
    /// Validate the inputs and assemble a request.
    ///
    /// Fails without consuming anything when the orientation is unspecified or a
    /// reference mark is missing. On success the calibration images are moved
    /// out of `images`.
    pub fn build(
        input_image_id: impl Into<String>,
        orientation: ImageOrientation,
        marks: &ReferenceMarks,
        images: &mut CalibrationImageSet,
        feet_line_method: FeetLineMethod,
        shoulder_tilt: ShoulderTilt,
    ) -> Result<Self> {
        let strategy = images.strategy(orientation)?;
        let reference_marks = marks.complete()?;
        Ok(Self {
            input_image_id: input_image_id.into(),
            strategy,
            reference_marks,
            calibration_images: images.take(),
            feet_line_method,
            shoulder_tilt,
        })
    }
}

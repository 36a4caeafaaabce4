//! Display-to-image coordinate mapping.
//!
//! Swing photos are shown as a scaled-down preview. Clicks arrive in preview
//! (display) pixels and must be stored in true image pixels.

/// Convert a display coordinate to image space.
///
/// `scale` is the display-to-image ratio (0.25 for a quarter-size preview).
/// Inputs are not validated; negative coordinates pass through unchanged.
#[inline]
pub fn to_image_space(display_x: f64, display_y: f64, scale: f64) -> (f64, f64) {
    (display_x / scale, display_y / scale)
}

/// Convert an image coordinate to display space. Inverse of [`to_image_space`].
#[inline]
pub fn to_display_space(x: f64, y: f64, scale: f64) -> (f64, f64) {
    (x * scale, y * scale)
}

/// Scale of a preview relative to the image it shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayScale {
    /// How many image pixels one display pixel covers (4 for a quarter-size preview).
    pub downscale: f64,
}

impl DisplayScale {
    /// Downscale used when nothing else is known about the preview.
    pub const DEFAULT_DOWNSCALE: f64 = 4.0;

    /// A preview shrunk by `downscale` (4.0 for a quarter-size preview).
    pub fn new(downscale: f64) -> Self {
        Self { downscale }
    }

    /// A preview drawn at full image size.
    pub fn identity() -> Self {
        Self::new(1.0)
    }

    /// Smallest whole-number downscale at which the image fits the canvas.
    ///
    /// Never smaller than 1: previews are not enlarged.
    pub fn fit(image_width: u32, image_height: u32, canvas_width: u32, canvas_height: u32) -> Self {
        let fit_axis = |image: u32, canvas: u32| -> u32 { image.div_ceil(canvas.max(1)) };
        let factor = fit_axis(image_width, canvas_width)
            .max(fit_axis(image_height, canvas_height))
            .max(1);
        Self::new(f64::from(factor))
    }

    /// Display-to-image ratio.
    #[inline]
    pub fn ratio(&self) -> f64 {
        1.0 / self.downscale
    }

    /// Map a click on the preview to image pixels.
    pub fn to_image_space(&self, display_x: f64, display_y: f64) -> (f64, f64) {
        to_image_space(display_x, display_y, self.ratio())
    }

    /// Map an image pixel to its position on the preview.
    pub fn to_display_space(&self, x: f64, y: f64) -> (f64, f64) {
        to_display_space(x, y, self.ratio())
    }

    /// Size of the preview for an image of the given size.
    pub fn preview_size(&self, image_width: u32, image_height: u32) -> (f64, f64) {
        self.to_display_space(f64::from(image_width), f64::from(image_height))
    }
}

impl Default for DisplayScale {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DOWNSCALE)
    }
}

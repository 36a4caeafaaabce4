//! Image inspection for preview scaling.
//!
//! The workflow never reads files; it only looks at bytes handed over by the
//! image acquisition layer to learn the image size.

use crate::coordinate::DisplayScale;
use crate::error::{GkatError, Result};

/// Preview canvas size used by the desktop client (a quarter of a 1080x2400 photo).
pub const DEFAULT_CANVAS_SIZE: (u32, u32) = (270, 600);

/// Check whether bytes look like an image format the decoder understands.
pub fn is_supported_image(data: &[u8]) -> bool {
    image::guess_format(data).is_ok()
}

/// Decode an image and return its `(width, height)` in pixels.
pub fn image_dimensions(data: &[u8]) -> Result<(u32, u32)> {
    let img = image::load_from_memory(data).map_err(|e| GkatError::image_decode("input image", e))?;
    Ok((img.width(), img.height()))
}

/// How a preview scale is chosen for an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PreviewScaling {
    /// Always use this downscale factor.
    Fixed(f64),
    /// Fit the image into a canvas of this size.
    FitCanvas { width: u32, height: u32 },
}

impl PreviewScaling {
    /// Resolve the display scale for an image.
    ///
    /// Fixed scaling never decodes the image; canvas fitting does.
    pub fn scale_for(&self, data: &[u8]) -> Result<DisplayScale> {
        match *self {
            PreviewScaling::Fixed(downscale) => Ok(DisplayScale::new(downscale)),
            PreviewScaling::FitCanvas { width, height } => {
                let (image_width, image_height) = image_dimensions(data)?;
                let scale = DisplayScale::fit(image_width, image_height, width, height);
                log::debug!(
                    "Preview for {}x{} image on {}x{} canvas: downscale {}",
                    image_width,
                    image_height,
                    width,
                    height,
                    scale.downscale
                );
                Ok(scale)
            }
        }
    }
}

impl Default for PreviewScaling {
    fn default() -> Self {
        PreviewScaling::Fixed(DisplayScale::DEFAULT_DOWNSCALE)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Encode a blank PNG of the given size.
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::new(width, height);
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .expect("Failed to encode PNG");
        out.into_inner()
    }

    #[test]
    fn test_dimensions_of_png() {
        let png = png_bytes(64, 32);
        assert!(is_supported_image(&png));
        assert_eq!(image_dimensions(&png), Ok((64, 32)));
    }

    #[test]
    fn test_garbage_is_not_an_image() {
        let junk = b"definitely not an image";
        assert!(!is_supported_image(junk));
        assert!(matches!(
            image_dimensions(junk),
            Err(GkatError::ImageDecode { .. })
        ));
    }

    #[test]
    fn test_fixed_scaling_skips_decoding() {
        let scale = PreviewScaling::Fixed(4.0).scale_for(b"not decoded").unwrap();
        assert_eq!(scale.downscale, 4.0);
    }

    #[test]
    fn test_fit_canvas_scaling() {
        let png = png_bytes(540, 1200);
        let scaling = PreviewScaling::FitCanvas {
            width: 270,
            height: 600,
        };
        assert_eq!(scaling.scale_for(&png).unwrap().downscale, 2.0);
    }
}

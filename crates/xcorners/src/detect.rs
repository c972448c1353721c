use crate::core::{GrayImageF32, ImageError, XCorner};
use crate::detector::{
    ParamsError, PyramidParams, PyramidXCornerDetector, XCornerDetector, XCornerParams,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("invalid grayscale image buffer length (expected {expected} bytes, got {got})")]
    InvalidGrayBuffer { expected: usize, got: usize },

    #[error("invalid grayscale image dimensions (width={width}, height={height})")]
    InvalidGrayDimensions { width: u32, height: u32 },

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Convert an 8-bit grayscale image to the detector's `f32` container.
///
/// Intensities keep their 0-255 range; the detectors are invariant to scale.
pub fn gray_f32_from_u8(img: &::image::GrayImage) -> GrayImageF32 {
    let data = img.as_raw().iter().map(|&p| p as f32).collect();
    GrayImageF32 {
        width: img.width() as usize,
        height: img.height() as usize,
        data,
    }
}

/// Multi-scale detection on an 8-bit image.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, params), fields(width = img.width(), height = img.height()))
)]
pub fn detect_xcorners(
    img: &::image::GrayImage,
    params: &PyramidParams,
) -> Result<Vec<XCorner>, DetectError> {
    let gray = gray_f32_from_u8(img);
    let mut detector = PyramidXCornerDetector::new(params.clone())?;
    detector.process(&gray.view());
    Ok(detector.take_corners())
}

/// Single-scale detection on an 8-bit image.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, params), fields(width = img.width(), height = img.height()))
)]
pub fn detect_xcorners_single_scale(
    img: &::image::GrayImage,
    params: &XCornerParams,
) -> Result<Vec<XCorner>, DetectError> {
    let gray = gray_f32_from_u8(img);
    let mut detector = XCornerDetector::new(params.clone())?;
    detector.process(&gray.view());
    Ok(detector.take_corners())
}

/// Build an `image::GrayImage` from a raw grayscale buffer.
pub fn gray_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<::image::GrayImage, DetectError> {
    let w = usize::try_from(width).ok();
    let h = usize::try_from(height).ok();
    let Some((w, h)) = w.zip(h) else {
        return Err(DetectError::InvalidGrayDimensions { width, height });
    };
    let Some(expected) = w.checked_mul(h) else {
        return Err(DetectError::InvalidGrayDimensions { width, height });
    };
    if pixels.len() != expected {
        return Err(DetectError::InvalidGrayBuffer {
            expected,
            got: pixels.len(),
        });
    }
    ::image::GrayImage::from_raw(width, height, pixels.to_vec())
        .ok_or(DetectError::InvalidGrayDimensions { width, height })
}

/// Multi-scale detection on a raw row-major 8-bit buffer.
pub fn detect_xcorners_from_gray_u8(
    width: u32,
    height: u32,
    pixels: &[u8],
    params: &PyramidParams,
) -> Result<Vec<XCorner>, DetectError> {
    let img = gray_image_from_slice(width, height, pixels)?;
    detect_xcorners(&img, params)
}

/// Multi-scale detection on a raw row-major `f32` buffer of any range.
pub fn detect_xcorners_from_gray_f32(
    width: usize,
    height: usize,
    data: Vec<f32>,
    params: &PyramidParams,
) -> Result<Vec<XCorner>, DetectError> {
    let gray = GrayImageF32::from_raw(width, height, data)?;
    let mut detector = PyramidXCornerDetector::new(params.clone())?;
    detector.process(&gray.view());
    Ok(detector.take_corners())
}

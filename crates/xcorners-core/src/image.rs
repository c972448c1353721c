/// Errors raised when wrapping a raw sample buffer as an image.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid image buffer length (expected {expected} samples, got {got})")]
    InvalidBufferLength { expected: usize, got: usize },
    #[error("invalid image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },
}

/// Borrowed single-channel floating point image.
#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [f32], // row-major, len = w*h
}

/// Owned single-channel floating point image.
///
/// Detector scratch buffers are `GrayImageF32`s that are reshaped in place on
/// every call, so the backing `Vec` only ever grows.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GrayImageF32 {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl GrayImageF32 {
    /// Zero-filled image.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Image filled with a constant value.
    pub fn from_value(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Wrap a row-major buffer.
    pub fn from_raw(width: usize, height: usize, data: Vec<f32>) -> Result<Self, ImageError> {
        let Some(expected) = width.checked_mul(height) else {
            return Err(ImageError::InvalidDimensions { width, height });
        };
        if data.len() != expected {
            return Err(ImageError::InvalidBufferLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build an image by evaluating `f(x, y)` at every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Change the shape, keeping the allocation. Contents are unspecified afterwards.
    pub fn reshape(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.resize(width * height, 0.0);
    }

    #[inline]
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        self.data[y * self.width + x] = value;
    }

    /// Largest absolute sample value, `0.0` for an empty image.
    pub fn max_abs(&self) -> f32 {
        self.data.iter().fold(0.0f32, |acc, v| acc.max(v.abs()))
    }
}

impl GrayImageView<'_> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    /// Sample with border extension: out-of-range coordinates are clamped to
    /// the nearest edge pixel.
    #[inline]
    pub fn get_extended(&self, x: i32, y: i32) -> f32 {
        let xx = x.clamp(0, self.width as i32 - 1) as usize;
        let yy = y.clamp(0, self.height as i32 - 1) as usize;
        self.data[yy * self.width + xx]
    }
}

/// Bilinear interpolation in pixel-index coordinates (pixel `i` centred at `i`),
/// border extended.
#[inline]
pub fn sample_bilinear(src: &GrayImageView<'_>, x: f32, y: f32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = src.get_extended(x0, y0);
    let p10 = src.get_extended(x0 + 1, y0);
    let p01 = src.get_extended(x0, y0 + 1);
    let p11 = src.get_extended(x0 + 1, y0 + 1);

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

/// Integral of the bilinearly interpolated image along the segment
/// `(x0, y0) -> (x1, y1)`.
///
/// Midpoint rule with at most half a pixel between samples. A zero-length
/// segment integrates to zero.
pub fn line_integral(src: &GrayImageView<'_>, x0: f32, y0: f32, x1: f32, y1: f32) -> f32 {
    let dx = x1 - x0;
    let dy = y1 - y0;
    let length = (dx * dx + dy * dy).sqrt();
    if length <= 0.0 {
        return 0.0;
    }

    let steps = (length * 2.0).ceil().max(1.0) as usize;
    let step = 1.0 / steps as f32;
    let mut sum = 0.0f32;
    for k in 0..steps {
        let t = (k as f32 + 0.5) * step;
        sum += sample_bilinear(src, x0 + t * dx, y0 + t * dy);
    }
    sum * length * step
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn from_raw_rejects_wrong_length() {
        let err = GrayImageF32::from_raw(3, 2, vec![0.0; 5]).unwrap_err();
        assert_eq!(
            err,
            ImageError::InvalidBufferLength {
                expected: 6,
                got: 5
            }
        );
    }

    #[test]
    fn bilinear_interpolates_and_extends_border() {
        let img = GrayImageF32::from_raw(2, 2, vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let v = img.view();
        assert_relative_eq!(sample_bilinear(&v, 0.5, 0.5), 1.5);
        assert_relative_eq!(sample_bilinear(&v, 1.0, 0.0), 1.0);
        // Beyond the right/bottom edge the last pixel is repeated.
        assert_relative_eq!(sample_bilinear(&v, 5.0, 5.0), 3.0);
        assert_relative_eq!(sample_bilinear(&v, -3.0, -1.0), 0.0);
    }

    #[test]
    fn line_integral_of_constant_is_length() {
        let img = GrayImageF32::from_value(10, 10, 2.0);
        let v = img.view();
        assert_relative_eq!(line_integral(&v, 1.0, 1.0, 4.0, 5.0), 10.0, epsilon = 1e-4);
        assert_eq!(line_integral(&v, 3.0, 3.0, 3.0, 3.0), 0.0);
    }

    #[test]
    fn line_integral_of_ramp_uses_midpoints() {
        // f(x, y) = x; integral over x in [0, 4] is 8.
        let img = GrayImageF32::from_fn(8, 3, |x, _| x as f32);
        let v = img.view();
        assert_relative_eq!(line_integral(&v, 0.0, 1.0, 4.0, 1.0), 8.0, epsilon = 1e-4);
    }

    #[test]
    fn reshape_keeps_requested_size() {
        let mut img = GrayImageF32::new(4, 4);
        img.reshape(2, 3);
        assert_eq!((img.width, img.height, img.data.len()), (2, 3, 6));
        img.reshape(5, 5);
        assert_eq!(img.data.len(), 25);
    }
}

//! Small dense filters operating on `GrayImageF32` buffers.
//!
//! Every filter writes into a caller-owned destination that is reshaped to
//! the required size, so repeated calls reuse memory.

use crate::image::{GrayImageF32, GrayImageView};

/// Normalised 1D Gaussian kernel of width `2 * radius + 1`.
///
/// The standard deviation is derived from the radius as `(2r + 1) / 5`, so
/// the kernel tails are negligible at the window edge.
pub fn gaussian_kernel(radius: usize) -> Vec<f32> {
    if radius == 0 {
        return vec![1.0];
    }
    let sigma = (2 * radius + 1) as f32 / 5.0;
    let denom = 2.0 * sigma * sigma;
    let r = radius as i32;
    let mut kernel: Vec<f32> = (-r..=r)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Separable Gaussian blur with border extension.
///
/// `tmp` holds the horizontal pass; both `tmp` and `dst` are reshaped to the
/// source size.
pub fn blur_gaussian(
    src: &GrayImageView<'_>,
    radius: usize,
    tmp: &mut GrayImageF32,
    dst: &mut GrayImageF32,
) {
    let (w, h) = (src.width, src.height);
    tmp.reshape(w, h);
    dst.reshape(w, h);
    if w == 0 || h == 0 {
        return;
    }

    let kernel = gaussian_kernel(radius);
    let r = radius as i32;

    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, &wk) in kernel.iter().enumerate() {
                acc += wk * src.get_extended(x as i32 + k as i32 - r, y as i32);
            }
            tmp.set(x, y, acc);
        }
    }

    let tmp_view = tmp.view();
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0.0f32;
            for (k, &wk) in kernel.iter().enumerate() {
                acc += wk * tmp_view.get_extended(x as i32, y as i32 + k as i32 - r);
            }
            dst.data[y * w + x] = acc;
        }
    }
}

/// 2×2 mean filter: `dst(x, y)` is the average of `src` over
/// `[x, x+1] × [y, y+1]`, border extended.
///
/// The output is therefore shifted by half a pixel towards the origin
/// relative to the input.
pub fn box_mean_2x2(src: &GrayImageView<'_>, dst: &mut GrayImageF32) {
    let (w, h) = (src.width, src.height);
    dst.reshape(w, h);
    for y in 0..h {
        for x in 0..w {
            let (xi, yi) = (x as i32, y as i32);
            let sum = src.get_extended(xi, yi)
                + src.get_extended(xi + 1, yi)
                + src.get_extended(xi, yi + 1)
                + src.get_extended(xi + 1, yi + 1);
            dst.data[y * w + x] = 0.25 * sum;
        }
    }
}

/// Halve the resolution by averaging non-overlapping 2×2 blocks.
///
/// An odd trailing row or column is dropped.
pub fn downsample_2x(src: &GrayImageView<'_>, dst: &mut GrayImageF32) {
    let w2 = src.width / 2;
    let h2 = src.height / 2;
    dst.reshape(w2, h2);

    for y in 0..h2 {
        for x in 0..w2 {
            let sx = x * 2;
            let sy = y * 2;
            let p00 = src.get(sx, sy);
            let p01 = src.get(sx + 1, sy);
            let p10 = src.get(sx, sy + 1);
            let p11 = src.get(sx + 1, sy + 1);
            dst.data[y * w2 + x] = 0.25 * (p00 + p01 + p10 + p11);
        }
    }
}

/// Copy `src` into `dst` scaled so that the largest absolute value is one.
///
/// Returns the applied scale factor. An all-zero image is copied unchanged
/// and reports a scale of one.
pub fn normalize_max_abs(src: &GrayImageView<'_>, dst: &mut GrayImageF32) -> f32 {
    dst.reshape(src.width, src.height);
    let max_abs = src.data.iter().fold(0.0f32, |acc, v| acc.max(v.abs()));
    let scale = if max_abs > 0.0 { 1.0 / max_abs } else { 1.0 };
    for (d, s) in dst.data.iter_mut().zip(src.data.iter()) {
        *d = s * scale;
    }
    scale
}

//! Dense X-corner intensity operator.
//!
//! Each pixel is scored from a 16-sample ring of radius 3. An ideal X-corner
//! is point symmetric (every sample equals the one diametrically opposite)
//! while samples 90° apart fall on squares of opposite colour. The response
//!
//! ```text
//! R = max_i(-a_i * b_i) - mean_j (v[j] - v[j + 8])^2
//! a_i = v[i] + v[i + 8] - 2m,   b_i = v[i + 4] + v[i + 12] - 2m
//! ```
//!
//! is positive at saddle points, negative along edges and in the lobes that
//! surround a corner, and exactly zero on flat regions. It is quadratic in
//! image contrast.

use crate::image::{GrayImageF32, GrayImageView};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// 16 point ring of radius 3, clockwise from +x (image y points down).
/// `RING3[i + 8] == -RING3[i]`.
pub const RING3: [(i32, i32); 16] = [
    (3, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-2, -2),
    (-1, -3),
    (0, -3),
    (1, -3),
    (2, -2),
    (3, -1),
];

/// Compute the X-corner intensity of every pixel of `src` into `dst`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(src, dst), fields(width = src.width, height = src.height))
)]
pub fn xcorner_intensity(src: &GrayImageView<'_>, dst: &mut GrayImageF32) {
    let (w, h) = (src.width, src.height);
    dst.reshape(w, h);
    if w == 0 || h == 0 {
        return;
    }

    let mut samples = [0.0f32; 16];
    for y in 0..h {
        for x in 0..w {
            for (s, &(dx, dy)) in samples.iter_mut().zip(RING3.iter()) {
                *s = src.get_extended(x as i32 + dx, y as i32 + dy);
            }
            dst.data[y * w + x] = ring_response(&samples);
        }
    }
}

/// Response of a single ring of samples ordered as [`RING3`].
#[inline]
pub fn ring_response(v: &[f32; 16]) -> f32 {
    let mean = pairwise_sum(v) / 16.0;

    let mut best = f32::NEG_INFINITY;
    for i in 0..4 {
        let a = v[i] + v[i + 8] - 2.0 * mean;
        let b = v[i + 4] + v[i + 12] - 2.0 * mean;
        best = best.max(-a * b);
    }

    let mut asymmetry = 0.0f32;
    for j in 0..8 {
        let d = v[j] - v[j + 8];
        asymmetry += d * d;
    }

    best - asymmetry / 8.0
}

/// Balanced summation; exact for a run of identical values, which keeps the
/// response of a flat region at exactly zero.
fn pairwise_sum(v: &[f32]) -> f32 {
    match v.len() {
        0 => 0.0,
        1 => v[0],
        n => {
            let (lo, hi) = v.split_at(n / 2);
            pairwise_sum(lo) + pairwise_sum(hi)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadrants(w: usize, h: usize, cx: f32, cy: f32) -> GrayImageF32 {
        GrayImageF32::from_fn(w, h, |x, y| {
            let u = x as f32 + 0.5 - cx;
            let v = y as f32 + 0.5 - cy;
            if (u > 0.0) == (v > 0.0) {
                1.0
            } else {
                0.0
            }
        })
    }

    #[test]
    fn ring_is_point_symmetric() {
        for i in 0..8 {
            assert_eq!(RING3[i].0, -RING3[i + 8].0);
            assert_eq!(RING3[i].1, -RING3[i + 8].1);
        }
    }

    #[test]
    fn flat_image_has_zero_response() {
        let img = GrayImageF32::from_value(12, 12, 0.7);
        let mut out = GrayImageF32::default();
        xcorner_intensity(&img.view(), &mut out);
        assert!(out.data.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn saddle_is_positive_and_edge_is_negative() {
        let img = quadrants(21, 21, 10.5, 10.5);
        let mut out = GrayImageF32::default();
        xcorner_intensity(&img.view(), &mut out);
        // Pixel 10 is centred at 10.5 in the pixel-edge frame: the saddle.
        assert!(out.get(10, 10) > 0.5);
        // Far along the vertical boundary only a straight edge is visible.
        assert!(out.get(10, 2) < 0.0);
        // Inside a uniform quadrant.
        assert_eq!(out.get(3, 3), 0.0);
    }
}

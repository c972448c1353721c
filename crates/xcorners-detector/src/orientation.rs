//! Orientation and contrast of a refined corner from radial line integrals.

use std::f32::consts::PI;

use xcorners_core::{bound_half_pi, gaussian_kernel, line_integral, GrayImageView};

const NUM_SPOKES: usize = 32;
const NUM_DIAMETERS: usize = NUM_SPOKES / 2;
const SPOKE_RADIUS: f32 = 4.0;

/// Result of scoring one corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SpokeScore {
    pub orientation: f32,
    pub intensity: f32,
    pub contrast: f32,
}

/// Scores candidates by comparing mean brightness along diameters.
///
/// A diameter through an X-corner that follows the dark diagonal is darker
/// than the perpendicular one through the light squares; the strongest such
/// difference gives both the orientation and the corner contrast.
#[derive(Clone, Debug)]
pub(crate) struct SpokeScorer {
    directions: [(f32, f32); NUM_SPOKES],
    kernel: Vec<f32>,
    spokes: [f32; NUM_SPOKES],
    diameters: [f32; NUM_DIAMETERS],
    smoothed: [f32; NUM_DIAMETERS],
    scores: [f32; NUM_DIAMETERS],
}

impl Default for SpokeScorer {
    fn default() -> Self {
        let mut directions = [(0.0, 0.0); NUM_SPOKES];
        for (i, d) in directions.iter_mut().enumerate() {
            let theta = 2.0 * PI * i as f32 / NUM_SPOKES as f32;
            *d = (theta.cos(), theta.sin());
        }
        Self {
            directions,
            kernel: gaussian_kernel(NUM_DIAMETERS / 4),
            spokes: [0.0; NUM_SPOKES],
            diameters: [0.0; NUM_DIAMETERS],
            smoothed: [0.0; NUM_DIAMETERS],
            scores: [0.0; NUM_DIAMETERS],
        }
    }
}

impl SpokeScorer {
    /// Score the corner at `(cx, cy)` (pixel-index frame of `image`).
    pub fn score(&mut self, image: &GrayImageView<'_>, cx: f32, cy: f32) -> SpokeScore {
        for (s, &(dx, dy)) in self.spokes.iter_mut().zip(self.directions.iter()) {
            let (x1, y1) = (cx + SPOKE_RADIUS * dx, cy + SPOKE_RADIUS * dy);
            *s = line_integral(image, cx, cy, x1, y1) / SPOKE_RADIUS;
        }
        for i in 0..NUM_DIAMETERS {
            self.diameters[i] = self.spokes[i] + self.spokes[i + NUM_DIAMETERS];
        }

        let r = self.kernel.len() / 2;
        for i in 0..NUM_DIAMETERS {
            let mut acc = 0.0f32;
            for (k, &w) in self.kernel.iter().enumerate() {
                let j = (i + NUM_DIAMETERS + k - r) % NUM_DIAMETERS;
                acc += w * self.diameters[j];
            }
            self.smoothed[i] = acc;
        }

        let quarter = NUM_DIAMETERS / 2;
        for i in 0..NUM_DIAMETERS {
            self.scores[i] = self.smoothed[i] - self.smoothed[(i + quarter) % NUM_DIAMETERS];
        }

        let mut best = 0;
        for i in 1..NUM_DIAMETERS {
            if self.scores[i] < self.scores[best] {
                best = i;
            }
        }

        let lower = self.scores[(best + NUM_DIAMETERS - 1) % NUM_DIAMETERS];
        let upper = self.scores[(best + 1) % NUM_DIAMETERS];
        let offset = poly_peak(lower, self.scores[best], upper);
        let orientation = bound_half_pi(PI * (best as f32 + offset) / NUM_DIAMETERS as f32);

        SpokeScore {
            orientation,
            intensity: -self.scores[best],
            contrast: 0.5 * (self.scores[(best + quarter) % NUM_DIAMETERS] - self.scores[best]),
        }
    }
}

/// Sub-sample offset of the extremum of a parabola through three equally
/// spaced samples, clamped to `[-0.5, 0.5]`.
pub(crate) fn poly_peak(lower: f32, middle: f32, upper: f32) -> f32 {
    let a = 0.5 * lower - middle + 0.5 * upper;
    let b = 0.5 * (upper - lower);
    if a == 0.0 {
        return 0.0;
    }
    (-b / (2.0 * a)).clamp(-0.5, 0.5)
}

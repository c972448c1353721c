//! Candidate verification tests.
//!
//! Each test is a cheap, local predicate; the detector runs them in order of
//! increasing cost and stops at the first failure.

use xcorners_core::{discretized_circle, sample_bilinear, GrayImageView};

/// `true` when `(xx, yy)` lies at least `border` pixels inside the image.
#[inline]
pub(crate) fn inside_border(xx: i32, yy: i32, width: usize, height: usize, border: usize) -> bool {
    let b = border as i32;
    xx >= b && yy >= b && xx < width as i32 - b && yy < height as i32 - b
}

/// Nearest pixel of a pixel-index coordinate.
#[inline]
pub(crate) fn nearest_pixel(x: f32, y: f32) -> (i32, i32) {
    ((x + 0.5).floor() as i32, (y + 0.5).floor() as i32)
}

/// At least `min_count` of the 3×3 intensity samples around `(xx, yy)` reach
/// `threshold`.
pub(crate) fn positive_inside(
    field: &GrayImageView<'_>,
    xx: i32,
    yy: i32,
    threshold: f32,
    min_count: usize,
) -> bool {
    count_window(field, xx, yy, 1, |v| v >= threshold) >= min_count
}

/// At least `min_count` of the 7×7 intensity samples around `(xx, yy)` are at
/// most `-threshold`: a real corner is ringed by strongly negative lobes.
pub(crate) fn negative_inside(
    field: &GrayImageView<'_>,
    xx: i32,
    yy: i32,
    threshold: f32,
    min_count: usize,
) -> bool {
    count_window(field, xx, yy, 3, |v| v <= -threshold) >= min_count
}

fn count_window(
    field: &GrayImageView<'_>,
    xx: i32,
    yy: i32,
    r: i32,
    pred: impl Fn(f32) -> bool,
) -> usize {
    let mut n = 0;
    for dy in -r..=r {
        for dx in -r..=r {
            if pred(field.get_extended(xx + dx, yy + dy)) {
                n += 1;
            }
        }
    }
    n
}

/// Binary pattern test on a discretised circle.
///
/// Samples are classified against their mean. Walking the circle once from
/// `(r, 0)` an X-corner shows 4 sign changes, or 3 when a boundary falls
/// between the last and the first sample, and every sample matches the one
/// diametrically opposite.
#[derive(Clone, Debug)]
pub(crate) struct CircleCheck {
    offsets: Vec<(i32, i32)>,
    values: Vec<f32>,
    above: Vec<bool>,
}

impl CircleCheck {
    pub fn new(radius: u32) -> Self {
        let offsets = discretized_circle(radius);
        let n = offsets.len();
        Self {
            offsets,
            values: vec![0.0; n],
            above: vec![false; n],
        }
    }

    /// Sample around `(cx, cy)` (pixel-index frame) and check the transition
    /// count lies in `transitions` (inclusive) and at most `symmetric_tol`
    /// samples disagree with their opposite.
    pub fn check(
        &mut self,
        image: &GrayImageView<'_>,
        cx: f32,
        cy: f32,
        (min_transitions, max_transitions): (usize, usize),
        symmetric_tol: usize,
    ) -> bool {
        let n = self.offsets.len();
        for (v, &(dx, dy)) in self.values.iter_mut().zip(self.offsets.iter()) {
            *v = sample_bilinear(image, cx + dx as f32, cy + dy as f32);
        }
        let mean = self.values.iter().sum::<f32>() / n as f32;
        for (a, &v) in self.above.iter_mut().zip(self.values.iter()) {
            *a = v > mean;
        }

        // The closing pair (n-1, 0) is not compared.
        let transitions = (1..n)
            .filter(|&i| self.above[i] != self.above[i - 1])
            .count();
        if transitions < min_transitions || transitions > max_transitions {
            return false;
        }

        let half = n / 2;
        let mismatches = (0..half)
            .filter(|&i| self.above[i] != self.above[i + half])
            .count();
        mismatches <= symmetric_tol
    }
}

/// Structure tensor summary at a pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct EdgeStats {
    /// Smaller eigenvalue.
    pub intensity: f32,
    /// `λmin / λmax`.
    pub ratio: f32,
}

/// Mean gradient structure tensor over a `(2r+1)²` window of the blurred
/// image, central differences, border extended.
///
/// Returns `None` when the window carries no gradient at all.
pub(crate) fn edge_stats(blurred: &GrayImageView<'_>, xx: i32, yy: i32, r: i32) -> Option<EdgeStats> {
    let (mut sxx, mut sxy, mut syy) = (0.0f32, 0.0f32, 0.0f32);
    for y in yy - r..=yy + r {
        for x in xx - r..=xx + r {
            let dx = blurred.get_extended(x + 1, y) - blurred.get_extended(x - 1, y);
            let dy = blurred.get_extended(x, y + 1) - blurred.get_extended(x, y - 1);
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }
    }
    let area = ((2 * r + 1) * (2 * r + 1)) as f32;
    let (sxx, sxy, syy) = (sxx / area, sxy / area, syy / area);

    let left = 0.5 * (sxx + syy);
    let b = 0.5 * (sxx - syy);
    let right = (b * b + sxy * sxy).sqrt();
    let lambda_max = left + right;
    if lambda_max <= 0.0 {
        return None;
    }
    let lambda_min = left - right;
    Some(EdgeStats {
        intensity: lambda_min,
        ratio: (lambda_min / lambda_max).clamp(-1.0, 1.0),
    })
}

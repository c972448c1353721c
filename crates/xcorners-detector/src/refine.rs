use xcorners_core::{sample_bilinear, GrayImageView};

/// Mean-shift towards the local centroid of the positive part of `field`.
///
/// The window is a `(2r+1)²` grid of unit-spaced bilinear samples centred on
/// the current estimate. Always runs `iterations` steps unless the window
/// carries no positive weight, in which case the last estimate is kept.
pub(crate) fn mean_shift(
    field: &GrayImageView<'_>,
    x: f32,
    y: f32,
    radius: usize,
    iterations: usize,
) -> (f32, f32) {
    let r = radius as i32;
    let (mut cx, mut cy) = (x, y);

    for _ in 0..iterations {
        let (mut sum_w, mut sum_x, mut sum_y) = (0.0f32, 0.0f32, 0.0f32);
        for dy in -r..=r {
            for dx in -r..=r {
                let w = sample_bilinear(field, cx + dx as f32, cy + dy as f32).max(0.0);
                sum_w += w;
                sum_x += w * dx as f32;
                sum_y += w * dy as f32;
            }
        }
        if sum_w <= 0.0 {
            break;
        }

        cx += sum_x / sum_w;
        cy += sum_y / sum_w;
    }

    (cx, cy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use xcorners_core::GrayImageF32;

    fn blob(cx: f32, cy: f32) -> GrayImageF32 {
        GrayImageF32::from_fn(20, 20, |x, y| {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            (-(dx * dx + dy * dy) / 2.0).exp() - 0.05
        })
    }

    #[test]
    fn stays_on_symmetric_peak() {
        let img = blob(10.0, 9.0);
        let (x, y) = mean_shift(&img.view(), 10.0, 9.0, 2, 5);
        assert_relative_eq!(x, 10.0, epsilon = 1e-5);
        assert_relative_eq!(y, 9.0, epsilon = 1e-5);
    }

    #[test]
    fn moves_towards_offset_peak() {
        let img = blob(10.4, 9.7);
        let (x, y) = mean_shift(&img.view(), 10.0, 10.0, 2, 5);
        assert!((x - 10.4).abs() < 0.15, "x = {x}");
        assert!((y - 9.7).abs() < 0.15, "y = {y}");
    }

    #[test]
    fn iteration_count_bounds_the_walk() {
        let img = blob(10.4, 9.7);
        let one = mean_shift(&img.view(), 8.0, 8.0, 2, 1);
        let five = mean_shift(&img.view(), 8.0, 8.0, 2, 5);
        assert!(one.0 < 10.0, "one step: {one:?}");
        assert!((five.0 - 10.4).abs() < 0.05, "five steps: {five:?}");
        assert_eq!(mean_shift(&img.view(), 8.0, 8.0, 2, 0), (8.0, 8.0));
    }

    #[test]
    fn zero_weight_keeps_estimate() {
        let img = GrayImageF32::from_value(10, 10, -1.0);
        assert_eq!(mean_shift(&img.view(), 4.25, 3.5, 2, 5), (4.25, 3.5));
    }
}

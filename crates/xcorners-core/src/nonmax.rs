use crate::image::GrayImageView;

/// Strict non-maximum suppression.
///
/// A pixel is reported when its value is strictly above `threshold` and
/// strictly greater than every other pixel in the `(2r+1)²` window centred on
/// it (the window is clipped at the image border). Plateaus therefore produce
/// no peak. A non-positive threshold yields nothing: the intensity operator
/// only marks corners with positive values.
///
/// `out` is cleared and then filled with peaks in row-major order.
pub fn nonmax_suppression(
    field: &GrayImageView<'_>,
    radius: usize,
    threshold: f32,
    out: &mut Vec<(usize, usize)>,
) {
    out.clear();
    if threshold.is_nan() || threshold <= 0.0 || field.width == 0 || field.height == 0 {
        return;
    }

    let (w, h) = (field.width, field.height);
    for y in 0..h {
        for x in 0..w {
            let v = field.get(x, y);
            if v <= threshold {
                continue;
            }
            if is_strict_local_max(field, x, y, radius, v) {
                out.push((x, y));
            }
        }
    }
}

fn is_strict_local_max(field: &GrayImageView<'_>, x: usize, y: usize, r: usize, v: f32) -> bool {
    let x0 = x.saturating_sub(r);
    let y0 = y.saturating_sub(r);
    let x1 = (x + r).min(field.width - 1);
    let y1 = (y + r).min(field.height - 1);

    for yy in y0..=y1 {
        for xx in x0..=x1 {
            if xx == x && yy == y {
                continue;
            }
            if field.get(xx, yy) >= v {
                return false;
            }
        }
    }
    true
}

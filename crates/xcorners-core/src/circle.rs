/// Integer offsets approximating a circle of the given radius.
///
/// Offsets are ordered by angle starting at `(radius, 0)` and the list is
/// point symmetric: with `n = len()`, `offsets[i + n / 2] == -offsets[i]`.
/// The length is always even.
pub fn discretized_circle(radius: u32) -> Vec<(i32, i32)> {
    if radius == 0 {
        return vec![(0, 0)];
    }

    let r = radius as f32;
    let first = (radius as i32, 0);
    let opposite = (-first.0, -first.1);
    let steps = 64 * radius as usize;

    let mut half: Vec<(i32, i32)> = Vec::new();
    for k in 0..steps {
        let theta = std::f32::consts::PI * k as f32 / steps as f32;
        let p = (
            (r * theta.cos()).round() as i32,
            (r * theta.sin()).round() as i32,
        );
        if p == opposite || half.last() == Some(&p) {
            continue;
        }
        half.push(p);
    }

    let mut out = half.clone();
    out.extend(half.iter().map(|&(x, y)| (-x, -y)));
    out
}

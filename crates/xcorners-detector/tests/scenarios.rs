use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use nalgebra::Point2;
use xcorners_core::{angle_dist_half_pi, bound_half_pi, GrayImageF32, XCorner};
use xcorners_detector::{PyramidParams, PyramidXCornerDetector, XCornerDetector, XCornerParams};

/// Deterministic xorshift64 noise in `[-1, 1)`.
struct Noise(u64);

impl Noise {
    fn next(&mut self) -> f32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        2.0 * ((x >> 40) as f32 / (1u64 << 24) as f32) - 1.0
    }
}

/// Smooth rotated saddle with its centre at `(cx, cy)` (pixel-edge frame).
fn saddle(size: usize, cx: f32, cy: f32, theta: f32, sharpness: f32, noise: f32) -> GrayImageF32 {
    let (s, c) = theta.sin_cos();
    let mut rng = Noise(0x9E37_79B9_7F4A_7C15);
    GrayImageF32::from_fn(size, size, |x, y| {
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        let u = c * dx + s * dy;
        let v = -s * dx + c * dy;
        let clean = 0.5 + 0.5 * (u / sharpness).tanh() * (v / sharpness).tanh();
        if noise > 0.0 {
            clean + noise * rng.next()
        } else {
            clean
        }
    })
}

/// Low-contrast noisy checkerboard with `cell`-pixel squares, rotated by
/// `theta` about the image centre.
fn noisy_checker(size: usize, cell: f32, theta: f32, noise: f32) -> GrayImageF32 {
    let o = size as f32 / 2.0;
    let (s, c) = theta.sin_cos();
    let mut rng = Noise(7);
    GrayImageF32::from_fn(size, size, |x, y| {
        let (dx, dy) = (x as f32 + 0.5 - o, y as f32 + 0.5 - o);
        let u = (c * dx + s * dy) / cell;
        let v = (-s * dx + c * dy) / cell;
        let dark = (u.floor() as i32 + v.floor() as i32).rem_euclid(2) == 1;
        let base = if dark { 0.2 } else { 0.8 };
        base + noise * rng.next()
    })
}

/// Grid points of [`noisy_checker`] at least `margin` pixels inside the image.
fn grid_points(size: usize, cell: f32, theta: f32, margin: f32) -> Vec<Point2<f32>> {
    let o = size as f32 / 2.0;
    let (s, c) = theta.sin_cos();
    let hi = size as f32 - margin;
    (-10..=10)
        .flat_map(|i| (-10..=10).map(move |j| (i as f32 * cell, j as f32 * cell)))
        .map(|(u, v)| Point2::new(o + c * u - s * v, o + s * u + c * v))
        .filter(|p| p.x >= margin && p.y >= margin && p.x <= hi && p.y <= hi)
        .collect()
}

fn distance_to_grid(p: Point2<f32>, grid: &[Point2<f32>]) -> f32 {
    grid.iter()
        .map(|&g| (p - g).norm())
        .fold(f32::INFINITY, f32::min)
}

fn nearest(corners: &[XCorner], p: Point2<f32>) -> Option<(&XCorner, f32)> {
    corners
        .iter()
        .map(|c| (c, (c.position - p).norm()))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

#[test]
fn single_scale_finds_rotated_saddle() {
    let theta = 20f32.to_radians();
    let img = saddle(40, 20.0, 20.0, theta, 2.0, 0.0);
    let mut det = XCornerDetector::new(XCornerParams::default()).unwrap();
    det.process(&img.view());

    assert_eq!(det.corners().len(), 1, "stats: {:?}", det.stats());
    let c = &det.corners()[0];
    assert!((c.position - Point2::new(20.0, 20.0)).norm() < 0.5, "{c:?}");
    assert!(c.edge_ratio > 0.1);
    let expected = bound_half_pi(theta - FRAC_PI_4);
    assert!(angle_dist_half_pi(c.orientation, expected) < 5f32.to_radians());
}

#[test]
fn saddle_patch_in_blank_image_is_found() {
    let theta = 20f32.to_radians();
    let patch = saddle(41, 20.0, 20.0, theta, 2.0, 0.0);
    let (ox, oy) = (30, 25);
    let img = GrayImageF32::from_fn(96, 80, |x, y| {
        let inside = (ox..ox + 41).contains(&x) && (oy..oy + 41).contains(&y);
        if inside {
            patch.get(x - ox, y - oy)
        } else {
            0.5
        }
    });
    let mut det = XCornerDetector::new(XCornerParams::default()).unwrap();
    det.process(&img.view());

    assert_eq!(det.corners().len(), 1, "stats: {:?}", det.stats());
    let c = &det.corners()[0];
    assert!((c.position - Point2::new(50.0, 45.0)).norm() < 0.5, "{c:?}");
    assert!(c.edge_ratio > 0.1);
    let expected = bound_half_pi(theta - FRAC_PI_4);
    assert!(angle_dist_half_pi(c.orientation, expected) < 5f32.to_radians());
}

#[test]
fn sub_pixel_position_is_recovered() {
    let img = saddle(40, 20.3, 19.6, 20f32.to_radians(), 2.0, 0.0);
    let mut det = XCornerDetector::new(XCornerParams::default()).unwrap();
    det.process(&img.view());

    let (c, dist) = nearest(det.corners(), Point2::new(20.3, 19.6)).unwrap();
    assert!(dist < 0.25, "{c:?}");
}

#[test]
fn noisy_saddle_is_still_found() {
    let img = saddle(40, 20.0, 20.0, 20f32.to_radians(), 2.0, 0.05);
    let mut det = XCornerDetector::new(XCornerParams::default()).unwrap();
    det.process(&img.view());

    assert_eq!(det.corners().len(), 1, "stats: {:?}", det.stats());
    let (_, dist) = nearest(det.corners(), Point2::new(20.0, 20.0)).unwrap();
    assert!(dist < 0.5);
}

#[test]
fn blank_image_has_no_corners() {
    let img = GrayImageF32::from_value(64, 48, 0.5);
    let mut single = XCornerDetector::new(XCornerParams::default()).unwrap();
    single.process(&img.view());
    assert!(single.corners().is_empty());

    let mut pyr = PyramidXCornerDetector::new(PyramidParams::default()).unwrap();
    pyr.process(&img.view());
    assert!(pyr.corners().is_empty());
}

#[test]
fn detection_is_deterministic() {
    let img = noisy_checker(48, 9.0, 20f32.to_radians(), 0.08);
    let params = XCornerParams {
        use_mean_shift: false,
        ..Default::default()
    };
    let mut a = XCornerDetector::new(params.clone()).unwrap();
    let mut b = XCornerDetector::new(params).unwrap();
    a.process(&img.view());
    let first = a.corners().to_vec();
    a.process(&img.view());
    b.process(&img.view());

    assert!(!first.is_empty());
    assert_eq!(first, a.corners());
    assert_eq!(first, b.corners());
}

#[test]
fn output_invariants_hold() {
    let size = 48;
    let theta = 20f32.to_radians();
    let border = XCornerParams::default().border as f32;
    let img = noisy_checker(size, 9.0, theta, 0.08);
    let mut det = XCornerDetector::new(XCornerParams::default()).unwrap();
    det.process(&img.view());

    let inside = grid_points(size, 9.0, theta, border);
    assert_eq!(inside.len(), 21);
    // Noise may cost a grid point or two, never more than a quarter.
    assert!(
        4 * det.corners().len() >= 3 * inside.len(),
        "{} corners, stats: {:?}",
        det.corners().len(),
        det.stats()
    );
    let grid = grid_points(size, 9.0, theta, 0.0);
    for c in det.corners() {
        assert!(distance_to_grid(c.position, &grid) < 0.5, "{c:?}");
        assert!(c.orientation > -FRAC_PI_2 && c.orientation <= FRAC_PI_2);
        assert!((-1.0..=1.0).contains(&c.edge_ratio));
        assert!(c.position.x >= border && c.position.x <= size as f32 - border);
        assert!(c.position.y >= border && c.position.y <= size as f32 - border);
        assert!(c.first);
    }
}

#[test]
fn raising_threshold_never_adds_corners() {
    let img = noisy_checker(48, 9.0, 20f32.to_radians(), 0.08);
    let mut previous = usize::MAX;
    for ratio in [0.02f32, 0.05, 0.1, 0.3, 0.6] {
        let params = XCornerParams {
            nonmax_threshold_ratio: ratio,
            edge_intensity_ratio_threshold: 0.0,
            ..Default::default()
        };
        let mut det = XCornerDetector::new(params).unwrap();
        det.process(&img.view());
        let n = det.corners().len();
        assert!(n <= previous, "ratio {ratio}: {n} > {previous}");
        previous = n;
    }
}

#[test]
fn pyramid_reports_saddle_once() {
    let img = saddle(200, 100.4, 99.3, 20f32.to_radians(), 3.0, 0.0);
    let mut det = PyramidXCornerDetector::new(PyramidParams::default()).unwrap();
    det.process(&img.view());

    assert_eq!(det.pyramid().len(), 2);
    assert_eq!(det.corners().len(), 1, "{:?}", det.corners());
    let c = &det.corners()[0];
    assert!((c.position - Point2::new(100.4, 99.3)).norm() < 0.5, "{c:?}");
    assert_eq!(c.level1, 0);
    assert!(c.level2 >= c.level1);
}

#[test]
fn pyramid_output_respects_border() {
    let size = 208;
    let theta = 20f32.to_radians();
    let img = noisy_checker(size, 24.0, theta, 0.05);
    let params = PyramidParams::default();
    let mut det = PyramidXCornerDetector::new(params.clone()).unwrap();
    det.process(&img.view());
    assert_eq!(det.pyramid().len(), 2);

    let border = params.detector.border as f32;
    let hi = size as f32 - border;
    let grid = grid_points(size, 24.0, theta, 0.0);
    let corners = det.corners();
    assert!(corners.len() >= 50, "{} corners", corners.len());
    for (i, c) in corners.iter().enumerate() {
        let p = c.position;
        assert!(p.x >= border && p.y >= border && p.x <= hi && p.y <= hi, "{c:?}");
        assert!(distance_to_grid(p, &grid) < 0.5, "{c:?}");
        // One output per grid point after consolidation.
        for other in &corners[i + 1..] {
            assert!((other.position - p).norm() > 12.0, "{c:?} / {other:?}");
        }
    }
}

#[test]
fn pyramid_disabled_matches_single_scale_on_normalised_input() {
    let img = saddle(40, 20.0, 20.0, 0.3, 2.0, 0.0);
    let params = PyramidParams {
        pyramid_top_size: 0,
        ..Default::default()
    };
    let mut pyr = PyramidXCornerDetector::new(params).unwrap();
    pyr.process(&img.view());
    assert_eq!(pyr.pyramid().len(), 1);

    let mut single = XCornerDetector::new(XCornerParams::default()).unwrap();
    single.process(&pyr.pyramid().levels()[0].image.view());
    assert_eq!(pyr.corners(), single.corners());
}

#[test]
fn params_roundtrip_through_json() {
    let params = PyramidParams {
        pyramid_top_size: 64,
        detector: XCornerParams {
            symmetric_tol: 2,
            use_mean_shift: false,
            ..Default::default()
        },
        ..Default::default()
    };
    let json = serde_json::to_string(&params).unwrap();
    let back: PyramidParams = serde_json::from_str(&json).unwrap();
    assert_eq!(back.pyramid_top_size, 64);
    assert_eq!(back.detector.symmetric_tol, 2);
    assert!(!back.detector.use_mean_shift);
    assert!(back.validate().is_ok());
}

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use xcorners_core::{
    blur_gaussian, box_mean_2x2, nonmax_suppression, xcorner_intensity, GrayImageF32,
    GrayImageView, XCorner,
};

use crate::orientation::SpokeScorer;
use crate::params::{ParamsError, XCornerParams};
use crate::refine::mean_shift;
use crate::verify::{
    edge_stats, inside_border, nearest_pixel, negative_inside, positive_inside, CircleCheck,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Half-size of the structure tensor window.
const EDGE_WINDOW_RADIUS: i32 = 3;

/// Why a non-max peak did not become a corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rejection {
    Border,
    PositiveInside,
    NegativeInside,
    Circle,
    RefinedCircle,
    EdgeRatio,
    Contrast,
}

/// Per-stage counters of the last [`XCornerDetector::process`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionStats {
    pub peaks: usize,
    pub border: usize,
    pub positive_inside: usize,
    pub negative_inside: usize,
    pub circle: usize,
    pub refined_circle: usize,
    pub edge_ratio: usize,
    pub contrast: usize,
    /// Passed every local test.
    pub verified: usize,
    /// Dropped by the image-wide edge intensity filter.
    pub edge_intensity: usize,
}

impl RejectionStats {
    fn record(&mut self, r: Rejection) {
        let slot = match r {
            Rejection::Border => &mut self.border,
            Rejection::PositiveInside => &mut self.positive_inside,
            Rejection::NegativeInside => &mut self.negative_inside,
            Rejection::Circle => &mut self.circle,
            Rejection::RefinedCircle => &mut self.refined_circle,
            Rejection::EdgeRatio => &mut self.edge_ratio,
            Rejection::Contrast => &mut self.contrast,
        };
        *slot += 1;
    }
}

/// Single-scale X-corner detector.
///
/// Owns every scratch buffer it needs; repeated calls to [`process`] on
/// images of similar size do not allocate.
///
/// [`process`]: XCornerDetector::process
#[derive(Clone, Debug)]
pub struct XCornerDetector {
    params: XCornerParams,
    /// Lower bound on the intensity scale used for thresholding. The pyramid
    /// detector raises it level by level so that weak coarse levels do not
    /// inflate their candidate counts.
    pub consider_max_intensity: f32,
    max_intensity: f32,
    threshold: f32,
    blurred: GrayImageF32,
    tmp: GrayImageF32,
    intensity_raw: GrayImageF32,
    intensity_2x2: GrayImageF32,
    peaks: Vec<(usize, usize)>,
    corners: Vec<XCorner>,
    circle3: CircleCheck,
    circle4: CircleCheck,
    scorer: SpokeScorer,
    stats: RejectionStats,
}

impl XCornerDetector {
    pub fn new(params: XCornerParams) -> Result<Self, ParamsError> {
        params.validate()?;
        Ok(Self {
            params,
            consider_max_intensity: 0.0,
            max_intensity: 0.0,
            threshold: 0.0,
            blurred: GrayImageF32::default(),
            tmp: GrayImageF32::default(),
            intensity_raw: GrayImageF32::default(),
            intensity_2x2: GrayImageF32::default(),
            peaks: Vec::new(),
            corners: Vec::new(),
            circle3: CircleCheck::new(3),
            circle4: CircleCheck::new(4),
            scorer: SpokeScorer::default(),
            stats: RejectionStats::default(),
        })
    }

    pub fn params(&self) -> &XCornerParams {
        &self.params
    }

    /// Detect corners in `image`. Results replace those of the previous call.
    ///
    /// Positions are in `image`'s pixel-edge frame.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, image), fields(width = image.width, height = image.height))
    )]
    pub fn process(&mut self, image: &GrayImageView<'_>) {
        self.corners.clear();
        self.stats = RejectionStats::default();
        self.max_intensity = 0.0;
        self.threshold = 0.0;
        if image.width == 0 || image.height == 0 {
            warn!("empty input image ({}x{})", image.width, image.height);
            return;
        }

        blur_gaussian(image, self.params.blur_radius, &mut self.tmp, &mut self.blurred);
        xcorner_intensity(&self.blurred.view(), &mut self.intensity_raw);
        box_mean_2x2(&self.intensity_raw.view(), &mut self.intensity_2x2);

        self.max_intensity = self.intensity_2x2.max_abs();
        let ratio = self.params.nonmax_threshold_ratio;
        self.threshold = self.max_intensity.max(self.consider_max_intensity) * ratio * ratio;

        nonmax_suppression(
            &self.intensity_2x2.view(),
            self.params.nonmax_radius,
            self.threshold,
            &mut self.peaks,
        );
        self.stats.peaks = self.peaks.len();

        let peaks = std::mem::take(&mut self.peaks);
        let mut max_edge = 0.0f32;
        for &(px, py) in &peaks {
            match self.verify(image, px, py) {
                Ok(corner) => {
                    max_edge = max_edge.max(corner.edge_intensity);
                    self.corners.push(corner);
                }
                Err(reason) => {
                    trace!("peak ({px}, {py}) rejected: {reason:?}");
                    self.stats.record(reason);
                }
            }
        }
        self.peaks = peaks;
        self.stats.verified = self.corners.len();

        let min_edge = self.params.edge_intensity_ratio_threshold * max_edge;
        self.corners.retain(|c| c.edge_intensity >= min_edge);
        self.stats.edge_intensity = self.stats.verified - self.corners.len();
        trace!("rejections: {:?}", self.stats);

        debug!(
            "{}x{}: threshold {:.3e}, {} peaks, {} verified, {} kept",
            image.width,
            image.height,
            self.threshold,
            self.stats.peaks,
            self.stats.verified,
            self.corners.len()
        );
    }

    /// Run the verification chain on one non-max peak of the 2×2 intensity.
    fn verify(&mut self, image: &GrayImageView<'_>, px: usize, py: usize) -> Result<XCorner, Rejection> {
        let (w, h) = (image.width, image.height);
        let p = &self.params;

        // The 2×2 box at `px` covers raw pixels `px` and `px + 1`.
        let (mut cx, mut cy) = (px as f32 + 0.5, py as f32 + 0.5);
        let (xx, yy) = nearest_pixel(cx, cy);
        if !inside_border(xx, yy, w, h, p.border) {
            return Err(Rejection::Border);
        }

        let raw = self.intensity_raw.view();
        if !positive_inside(&raw, xx, yy, self.threshold, p.positive_inside_min) {
            return Err(Rejection::PositiveInside);
        }
        if !negative_inside(&raw, xx, yy, self.threshold, p.negative_inside_min) {
            return Err(Rejection::NegativeInside);
        }

        let tol = p.symmetric_tol;
        if !self.circle4.check(image, cx, cy, p.circle_transitions, tol)
            || !self.circle3.check(image, cx, cy, p.inner_circle_transitions, tol)
        {
            return Err(Rejection::Circle);
        }

        if p.use_mean_shift {
            let (mx, my) = mean_shift(
                &self.intensity_2x2.view(),
                cx - 0.5,
                cy - 0.5,
                p.mean_shift_radius(),
                p.mean_shift_iterations,
            );
            cx = mx + 0.5;
            cy = my + 0.5;
        }

        let (xx, yy) = nearest_pixel(cx, cy);
        if !inside_border(xx, yy, w, h, p.border) {
            return Err(Rejection::Border);
        }
        if !self.circle4.check(
            image,
            cx,
            cy,
            p.refined_circle_transitions,
            p.refined_symmetric_tol(),
        ) {
            return Err(Rejection::RefinedCircle);
        }

        let blurred = self.blurred.view();
        let edge = edge_stats(&blurred, xx, yy, EDGE_WINDOW_RADIUS).ok_or(Rejection::EdgeRatio)?;
        if edge.ratio < p.edge_aspect_ratio_threshold {
            return Err(Rejection::EdgeRatio);
        }

        let score = self.scorer.score(&blurred, cx, cy);
        if score.intensity < p.refined_xcorner_threshold {
            return Err(Rejection::Contrast);
        }

        Ok(XCorner {
            orientation: score.orientation,
            intensity: score.intensity,
            contrast: score.contrast,
            edge_intensity: edge.intensity,
            edge_ratio: edge.ratio,
            ..XCorner::at(cx + 0.5, cy + 0.5)
        })
    }

    /// Corners found by the last call to [`process`](Self::process).
    pub fn corners(&self) -> &[XCorner] {
        &self.corners
    }

    /// Move the corners out, leaving the detector's list empty.
    pub fn take_corners(&mut self) -> Vec<XCorner> {
        std::mem::take(&mut self.corners)
    }

    /// Largest absolute value of the 2×2 intensity image.
    pub fn max_intensity(&self) -> f32 {
        self.max_intensity
    }

    /// Non-max threshold used by the last call.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn stats(&self) -> &RejectionStats {
        &self.stats
    }

    /// Input after Gaussian smoothing.
    pub fn blurred(&self) -> &GrayImageF32 {
        &self.blurred
    }

    /// Dense X-corner intensity.
    pub fn intensity_raw(&self) -> &GrayImageF32 {
        &self.intensity_raw
    }

    /// 2×2 box-filtered intensity, the field non-max suppression runs on.
    pub fn intensity_2x2(&self) -> &GrayImageF32 {
        &self.intensity_2x2
    }
}

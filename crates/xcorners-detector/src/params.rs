use serde::{Deserialize, Serialize};
use xcorners_core::discretized_circle;

/// Rejected parameter values.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("nonmax_threshold_ratio must be in (0, 1], got {0}")]
    ThresholdRatio(f32),
    #[error("{name} must be finite and non-negative, got {value}")]
    NegativeThreshold { name: &'static str, value: f32 },
    #[error("border must be at least {min} pixels, got {got}")]
    Border { min: usize, got: usize },
    #[error("nonmax_radius must be at least 1")]
    NonmaxRadius,
    #[error("mean-shift is enabled but mean_shift_iterations is 0")]
    MeanShiftIterations,
    #[error("search_radius must be finite and positive, got {0}")]
    SearchRadius(f32),
    #[error("search_max_count must be at least 1")]
    SearchMaxCount,
    #[error("symmetric_tol must not exceed {max}, got {got}")]
    SymmetricTol { max: usize, got: usize },
    #[error("{name} must not exceed the window size {max}, got {got}")]
    WindowCount {
        name: &'static str,
        max: usize,
        got: usize,
    },
    #[error("{name} is empty ({min} > {max})")]
    TransitionRange {
        name: &'static str,
        min: usize,
        max: usize,
    },
}

/// Smallest border that keeps every fixed-size window of the verifier inside
/// the image.
pub const MIN_BORDER: usize = 3;

/// Parameters of the single-scale X-corner detector.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct XCornerParams {
    /// The non-max threshold is `max_intensity * ratio²` (the intensity is
    /// quadratic in contrast).
    pub nonmax_threshold_ratio: f32,
    /// Non-maximum suppression radius; also sets the mean-shift window
    /// (`2 * nonmax_radius`).
    pub nonmax_radius: usize,
    /// Corners whose edge intensity is below this fraction of the largest
    /// edge intensity in the image are dropped.
    pub edge_intensity_ratio_threshold: f32,
    /// Smallest accepted `λmin / λmax` of the structure tensor.
    pub edge_aspect_ratio_threshold: f32,
    /// Smallest accepted spoke contrast score.
    pub refined_xcorner_threshold: f32,
    /// Number of circle samples allowed to break point symmetry.
    pub symmetric_tol: usize,
    /// Symmetry tolerance of the post-refinement circle test.
    /// `symmetric_tol - 1` when unset.
    pub refined_symmetric_tol: Option<usize>,
    /// Minimum count of 3×3 raw intensity samples at or above the threshold.
    pub positive_inside_min: usize,
    /// Minimum count of 7×7 raw intensity samples at or below `-threshold`.
    pub negative_inside_min: usize,
    /// Accepted `(min, max)` up/down transitions on the radius-4 circle.
    pub circle_transitions: (usize, usize),
    /// Accepted transitions on the radius-3 circle.
    pub inner_circle_transitions: (usize, usize),
    /// Accepted transitions on the radius-4 circle after refinement.
    pub refined_circle_transitions: (usize, usize),
    /// Gaussian blur radius applied before the intensity operator.
    pub blur_radius: usize,
    /// Sub-pixel refinement by mean-shift.
    pub use_mean_shift: bool,
    pub mean_shift_iterations: usize,
    /// Candidates closer than this to an image edge are discarded.
    pub border: usize,
}

impl Default for XCornerParams {
    fn default() -> Self {
        Self {
            nonmax_threshold_ratio: 0.05,
            nonmax_radius: 1,
            edge_intensity_ratio_threshold: 0.01,
            edge_aspect_ratio_threshold: 0.1,
            refined_xcorner_threshold: 0.001,
            symmetric_tol: 3,
            refined_symmetric_tol: None,
            positive_inside_min: 4,
            negative_inside_min: 12,
            circle_transitions: (3, 6),
            inner_circle_transitions: (3, 4),
            refined_circle_transitions: (4, 4),
            blur_radius: 1,
            use_mean_shift: true,
            mean_shift_iterations: 5,
            border: MIN_BORDER,
        }
    }
}

impl XCornerParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        let r = self.nonmax_threshold_ratio;
        if !r.is_finite() || r <= 0.0 || r > 1.0 {
            return Err(ParamsError::ThresholdRatio(r));
        }
        for (name, value) in [
            (
                "edge_intensity_ratio_threshold",
                self.edge_intensity_ratio_threshold,
            ),
            ("edge_aspect_ratio_threshold", self.edge_aspect_ratio_threshold),
            ("refined_xcorner_threshold", self.refined_xcorner_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ParamsError::NegativeThreshold { name, value });
            }
        }
        if self.nonmax_radius == 0 {
            return Err(ParamsError::NonmaxRadius);
        }
        if self.border < MIN_BORDER {
            return Err(ParamsError::Border {
                min: MIN_BORDER,
                got: self.border,
            });
        }
        if self.use_mean_shift && self.mean_shift_iterations == 0 {
            return Err(ParamsError::MeanShiftIterations);
        }
        // Half of the smallest verification circle.
        let max_tol = discretized_circle(3).len() / 2;
        for tol in [self.symmetric_tol, self.refined_symmetric_tol()] {
            if tol > max_tol {
                return Err(ParamsError::SymmetricTol { max: max_tol, got: tol });
            }
        }
        for (name, got, max) in [
            ("positive_inside_min", self.positive_inside_min, 9),
            ("negative_inside_min", self.negative_inside_min, 49),
        ] {
            if got > max {
                return Err(ParamsError::WindowCount { name, max, got });
            }
        }
        for (name, (min, max)) in [
            ("circle_transitions", self.circle_transitions),
            ("inner_circle_transitions", self.inner_circle_transitions),
            ("refined_circle_transitions", self.refined_circle_transitions),
        ] {
            if min > max {
                return Err(ParamsError::TransitionRange { name, min, max });
            }
        }
        Ok(())
    }

    /// Symmetry tolerance after refinement.
    #[inline]
    pub fn refined_symmetric_tol(&self) -> usize {
        self.refined_symmetric_tol
            .unwrap_or(self.symmetric_tol.saturating_sub(1))
    }

    /// Half-size of the mean-shift window.
    #[inline]
    pub fn mean_shift_radius(&self) -> usize {
        2 * self.nonmax_radius
    }
}

/// Parameters of the pyramid detector and cross-scale consolidation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PyramidParams {
    /// Single-scale detector settings shared by every level.
    pub detector: XCornerParams,
    /// Downsampling stops before the smaller image side drops below this.
    /// `0` disables the pyramid.
    pub pyramid_top_size: usize,
    /// Hard floor on the smaller side of any level. Derived from the
    /// non-max radius when unset.
    pub min_level_size: Option<usize>,
    /// Neighbour search radius in non-max radii; the effective radius when
    /// matching against level `u` is `search_radius * nonmax_radius * (u + 1)`.
    pub search_radius: f32,
    /// Maximum number of neighbours considered per query.
    pub search_max_count: usize,
}

impl Default for PyramidParams {
    fn default() -> Self {
        Self {
            detector: XCornerParams::default(),
            pyramid_top_size: 100,
            min_level_size: None,
            search_radius: 4.0,
            search_max_count: 5,
        }
    }
}

impl PyramidParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        self.detector.validate()?;
        if !self.search_radius.is_finite() || self.search_radius <= 0.0 {
            return Err(ParamsError::SearchRadius(self.search_radius));
        }
        if self.search_max_count == 0 {
            return Err(ParamsError::SearchMaxCount);
        }
        Ok(())
    }

    /// Floor on the smaller side of a pyramid level.
    pub fn min_level_size(&self) -> usize {
        self.min_level_size
            .unwrap_or((1 + 2 * self.detector.nonmax_radius) * 5)
    }

    /// Neighbour search radius (base-image pixels) used against `level`.
    #[inline]
    pub fn search_radius_at(&self, level: usize) -> f32 {
        self.search_radius * self.detector.nonmax_radius as f32 * (level + 1) as f32
    }

    /// Largest distance a finer corner may move when adopting a coarser
    /// detection.
    #[inline]
    pub fn adopt_radius(&self) -> f32 {
        self.detector.nonmax_radius as f32
    }
}

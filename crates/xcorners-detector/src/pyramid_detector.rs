use log::{debug, warn};
use xcorners_core::{GrayImageView, XCorner};

use crate::consolidate::consolidate_levels;
use crate::detector::XCornerDetector;
use crate::params::{ParamsError, PyramidParams};
use crate::pyramid::ImagePyramid;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Multi-scale X-corner detector.
///
/// Runs [`XCornerDetector`] on every level of a normalised image pyramid,
/// coarsest first, then merges the per-level detections into one list in
/// base-image coordinates.
#[derive(Clone, Debug)]
pub struct PyramidXCornerDetector {
    params: PyramidParams,
    detector: XCornerDetector,
    pyramid: ImagePyramid,
    levels: Vec<Vec<XCorner>>,
    corners: Vec<XCorner>,
}

impl PyramidXCornerDetector {
    pub fn new(params: PyramidParams) -> Result<Self, ParamsError> {
        params.validate()?;
        let detector = XCornerDetector::new(params.detector.clone())?;
        Ok(Self {
            params,
            detector,
            pyramid: ImagePyramid::default(),
            levels: Vec::new(),
            corners: Vec::new(),
        })
    }

    pub fn params(&self) -> &PyramidParams {
        &self.params
    }

    /// Detect corners in `image`. Results replace those of the previous call.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, image), fields(width = image.width, height = image.height))
    )]
    pub fn process(&mut self, image: &GrayImageView<'_>) {
        self.corners.clear();
        for lvl in &mut self.levels {
            lvl.clear();
        }
        if image.width == 0 || image.height == 0 {
            warn!("empty input image ({}x{})", image.width, image.height);
            return;
        }

        self.pyramid.build(
            image,
            self.params.pyramid_top_size,
            self.params.min_level_size(),
        );
        let n = self.pyramid.len();
        self.levels.resize_with(n, Vec::new);

        // Coarse to fine: a level's threshold never drops below the
        // strongest response seen on any coarser level.
        self.detector.consider_max_intensity = 0.0;
        for (level, pl) in self.pyramid.levels().iter().enumerate().rev() {
            self.detector.process(&pl.image.view());
            self.detector.consider_max_intensity = self
                .detector
                .consider_max_intensity
                .max(self.detector.max_intensity());

            let out = &mut self.levels[level];
            out.extend(self.detector.corners().iter().map(|c| XCorner {
                position: c.position * pl.scale,
                level1: level as u32,
                level2: level as u32,
                level_max: level as u32,
                first: true,
                ..c.clone()
            }));
            debug!("level {level}: {} corners", out.len());
        }

        self.corners = consolidate_levels(&mut self.levels, &self.params);
        debug!("{} corners after consolidation", self.corners.len());
    }

    /// Consolidated corners of the last call, base-image pixel-edge frame.
    pub fn corners(&self) -> &[XCorner] {
        &self.corners
    }

    pub fn take_corners(&mut self) -> Vec<XCorner> {
        std::mem::take(&mut self.corners)
    }

    /// The pyramid built by the last call.
    pub fn pyramid(&self) -> &ImagePyramid {
        &self.pyramid
    }

    /// Per-level detections of the last call after consolidation, in
    /// base-image coordinates. Dead corners (`first == false`) are included.
    pub fn levels(&self) -> &[Vec<XCorner>] {
        &self.levels
    }

    /// The single-scale detector shared by all levels.
    pub fn detector(&self) -> &XCornerDetector {
        &self.detector
    }
}

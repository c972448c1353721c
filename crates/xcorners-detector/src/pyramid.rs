//! Normalised image pyramid built by repeated 2× downsampling.

use log::debug;
use xcorners_core::{downsample_2x, normalize_max_abs, GrayImageF32, GrayImageView};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A single pyramid level.
#[derive(Clone, Debug, Default)]
pub struct PyramidLevel {
    pub image: GrayImageF32,
    /// Multiply level coordinates by this to get base-image coordinates
    /// (`2^level`).
    pub scale: f32,
}

/// A top-down pyramid where `levels()[0]` is the base (full resolution).
///
/// Level buffers persist across [`build`](Self::build) calls; only a change to
/// a larger input allocates.
#[derive(Clone, Debug, Default)]
pub struct ImagePyramid {
    levels: Vec<PyramidLevel>,
    len: usize,
}

impl ImagePyramid {
    /// Rebuild from `base`.
    ///
    /// Level 0 is `base` normalised to a maximum absolute value of one. A new
    /// level is added while the smaller side of the next level would still be
    /// at least `max(top_size, min_size)`. `top_size == 0` keeps only the
    /// base level.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, base), fields(width = base.width, height = base.height))
    )]
    pub fn build(&mut self, base: &GrayImageView<'_>, top_size: usize, min_size: usize) {
        self.len = 0;
        if self.levels.is_empty() {
            self.levels.push(PyramidLevel::default());
        }
        normalize_max_abs(base, &mut self.levels[0].image);
        self.levels[0].scale = 1.0;
        self.len = 1;

        if top_size == 0 {
            return;
        }
        let floor = top_size.max(min_size).max(1);

        loop {
            let prev = &self.levels[self.len - 1].image;
            let (nw, nh) = (prev.width / 2, prev.height / 2);
            if nw.min(nh) < floor {
                break;
            }
            if self.levels.len() == self.len {
                self.levels.push(PyramidLevel::default());
            }
            let (done, rest) = self.levels.split_at_mut(self.len);
            let src = &done[self.len - 1];
            downsample_2x(&src.image.view(), &mut rest[0].image);
            rest[0].scale = src.scale * 2.0;
            self.len += 1;
        }

        debug!(
            "pyramid: {} levels, top {}x{}",
            self.len,
            self.levels[self.len - 1].image.width,
            self.levels[self.len - 1].image.height
        );
    }

    pub fn levels(&self) -> &[PyramidLevel] {
        &self.levels[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

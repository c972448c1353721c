use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// One candidate or detected X-corner.
///
/// The position is expressed in the frame of whichever image the corner
/// currently refers to: level-local while a pyramid level is being processed,
/// base-image pixels once rescaled. Coordinates use the pixel-edge convention
/// (the centre of pixel `(i, j)` is `(i + 0.5, j + 0.5)`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct XCorner {
    pub position: Point2<f32>,
    /// Direction of the dark diagonal, radians in `(-π/2, π/2]`.
    pub orientation: f32,
    /// Fit quality, larger is more corner-like.
    pub intensity: f32,
    /// Smallest structure-tensor eigenvalue.
    pub edge_intensity: f32,
    /// Eigenvalue ratio `λmin / λmax` of the structure tensor, in `[-1, 1]`.
    /// Close to zero for straight edges.
    pub edge_ratio: f32,
    /// Signed black/white contrast along `orientation`.
    pub contrast: f32,
    /// Finest pyramid level that produced this corner.
    pub level1: u32,
    /// Coarsest pyramid level that confirmed this corner.
    pub level2: u32,
    /// Level whose values (position, scores) the corner currently carries.
    pub level_max: u32,
    /// `false` once another detection has been judged authoritative for this
    /// neighbourhood.
    pub first: bool,
}

impl Default for XCorner {
    fn default() -> Self {
        Self {
            position: Point2::origin(),
            orientation: 0.0,
            intensity: 0.0,
            edge_intensity: 0.0,
            edge_ratio: 0.0,
            contrast: 0.0,
            level1: 0,
            level2: 0,
            level_max: 0,
            first: true,
        }
    }
}

impl XCorner {
    /// Fresh candidate at the given position.
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Point2::new(x, y),
            ..Self::default()
        }
    }

    /// Squared Euclidean distance between two corners.
    #[inline]
    pub fn distance_sq(&self, other: &XCorner) -> f32 {
        (self.position - other.position).norm_squared()
    }

    /// Replace geometry and scores with `other`'s, keeping `level1` and the
    /// liveness flag.
    ///
    /// Used when a coarser detection wins arbitration: the finest level that
    /// saw this corner is provenance that must survive the overwrite.
    pub fn adopt(&mut self, other: &XCorner) {
        let (level1, first) = (self.level1, self.first);
        *self = other.clone();
        self.level1 = level1;
        self.first = first;
    }
}

//! X-corner (chessboard saddle point) detection.
//!
//! Two entry points:
//!
//! - [`XCornerDetector`] runs on a single image: blur, dense X-corner
//!   intensity, non-maximum suppression, then a cascade of local tests and
//!   sub-pixel refinement per candidate.
//! - [`PyramidXCornerDetector`] runs the single-scale detector on every level
//!   of a 2× pyramid and consolidates duplicates across scales.
//!
//! All positions use the pixel-edge convention: the centre of pixel `(i, j)`
//! is `(i + 0.5, j + 0.5)`.
//!
//! ```
//! use xcorners_core::GrayImageF32;
//! use xcorners_detector::{PyramidParams, PyramidXCornerDetector};
//!
//! let img = GrayImageF32::from_fn(64, 64, |x, y| ((x / 16 + y / 16) % 2) as f32);
//! let mut det = PyramidXCornerDetector::new(PyramidParams::default()).unwrap();
//! det.process(&img.view());
//! for c in det.corners() {
//!     println!("({:.2}, {:.2}) angle={:.2}", c.position.x, c.position.y, c.orientation);
//! }
//! ```

mod consolidate;
mod detector;
mod orientation;
mod params;
mod pyramid;
mod pyramid_detector;
mod refine;
mod verify;

pub use detector::{RejectionStats, XCornerDetector};
pub use params::{ParamsError, PyramidParams, XCornerParams, MIN_BORDER};
pub use pyramid::{ImagePyramid, PyramidLevel};
pub use pyramid_detector::PyramidXCornerDetector;

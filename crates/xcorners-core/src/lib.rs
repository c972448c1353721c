//! Core types and primitives for X-corner detection.
//!
//! This crate holds the image container, the dense filters and samplers the
//! detector is built from, and the [`XCorner`] record. It contains no
//! detection logic.
//!
//! Images are single-channel `f32`, row-major. Inputs in other pixel formats
//! are converted once at the boundary (see the `xcorners` facade crate).

mod angle;
mod circle;
mod corner;
mod filter;
mod image;
mod intensity;
mod logger;
mod nonmax;

pub use angle::{angle_dist_half_pi, bound_half_pi};
pub use circle::discretized_circle;
pub use corner::XCorner;
pub use filter::{blur_gaussian, box_mean_2x2, downsample_2x, gaussian_kernel, normalize_max_abs};
pub use image::{line_integral, sample_bilinear, GrayImageF32, GrayImageView, ImageError};
pub use intensity::{ring_response, xcorner_intensity, RING3};
pub use nonmax::nonmax_suppression;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;

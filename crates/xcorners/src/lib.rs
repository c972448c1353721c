//! High-level facade crate for the `xcorners-*` workspace.
//!
//! This crate provides:
//! - re-exports of the core types and both detectors
//! - (feature `image`) helpers that run detection on an `image::GrayImage` or
//!   a raw 8-bit buffer
//! - (feature `cli`) the `xcorners` command-line tool
//!
//! ## Quickstart
//!
//! ```no_run
//! use xcorners::detect;
//! use xcorners::PyramidParams;
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = ImageReader::open("board.png")?.decode()?.to_luma8();
//! let corners = detect::detect_xcorners(&img, &PyramidParams::default())?;
//! println!("detected {} corners", corners.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `xcorners::core`: image container, filters, samplers, [`XCorner`].
//! - `xcorners::detector`: [`XCornerDetector`] and [`PyramidXCornerDetector`].
//! - `xcorners::detect` (feature `image`): end-to-end helpers.

pub use xcorners_core as core;
pub use xcorners_detector as detector;

pub use xcorners_core::{init_with_level, GrayImageF32, GrayImageView, ImageError, XCorner};
pub use xcorners_detector::{
    ParamsError, PyramidParams, PyramidXCornerDetector, RejectionStats, XCornerDetector,
    XCornerParams,
};

#[cfg(feature = "tracing")]
pub use xcorners_core::init_tracing;

#[cfg(feature = "image")]
pub mod detect;

//! High-level facade crate for the `crossgrid-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the core types and the detector
//! - (feature-gated) end-to-end helpers that decode an image file with the
//!   `image` crate, validate it, downscale it to the processing resolution and
//!   run the grid detector on it.
//!
//! ## Quickstart
//!
//! ```no_run
//! use crossgrid::{detect, DisplaySize};
//!
//! let display = DisplaySize::new(1024.0, 768.0);
//! let result = detect::detect_grid_path("puzzle.png", Some(display));
//! match result.calibration() {
//!     Some(cal) => println!("{}x{} cells", cal.grid_width, cal.grid_height),
//!     None => println!("detection failed: {}", result.error().unwrap_or_default()),
//! }
//! ```
//!
//! ## API map
//! - `crossgrid::core`: pixel buffers, masks, boxes, calibration, logging.
//! - `crossgrid::detector`: the detection pipeline and its parameters.
//! - `crossgrid::detect` (feature `image`): end-to-end helpers from files,
//!   encoded bytes or `image::DynamicImage`.

pub use crossgrid_core as core;
pub use crossgrid_detect as detector;

pub use crossgrid_core::{CalibrationLimits, DisplaySize, GridBounds, GridCalibration};
pub use crossgrid_detect::{
    detect_grid_from_rgba, DetectError, DetectionResult, DetectorParams, GridDetector,
};

#[cfg(feature = "image")]
pub mod detect;

//! Core types and utilities for crossword grid calibration.
//!
//! This crate holds the data model shared by the detector and its consumers:
//! raw RGBA pixel buffers, binary masks, detected cell boxes and the final
//! [`GridCalibration`]. It does *not* decode images; callers hand in pixels
//! they already own.

mod boxes;
mod calibration;
mod image;
mod logger;
mod mask;
mod threshold;

pub use boxes::{DetectedBox, GridBounds};
pub use calibration::{CalibrationError, CalibrationLimits, DisplaySize, GridCalibration};
pub use image::{ImageBufferError, RgbaImage, RgbaImageView};
pub use mask::BinaryMask;
pub use threshold::{gray_histogram, otsu_threshold, GrayHistogram};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, parse_level};

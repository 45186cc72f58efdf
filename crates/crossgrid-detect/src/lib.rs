//! Crossword grid detector built on top of `crossgrid-core`.
//!
//! ## Quickstart
//!
//! ```
//! use crossgrid_core::DisplaySize;
//! use crossgrid_detect::{synthetic::SyntheticGrid, GridDetector};
//!
//! let img = SyntheticGrid::new(15, 15, 30).render();
//! let display = DisplaySize::new(img.width as f32, img.height as f32);
//! let result = GridDetector::default().detect_result(&img.view(), Some(display));
//! println!("detected: {}", result.is_success());
//! ```
//!
//! Pipeline:
//! 1. Otsu threshold over the channel-mean histogram; dark pixels become
//!    foreground.
//! 2. 4-connected flood fill over background pixels; every component whose
//!    bounding box passes the size and aspect filter is a candidate cell.
//! 3. Keep the largest group of similarly sized boxes, then tighten around
//!    the median size.
//! 4. Estimate the cell pitch per axis from center deltas, snap the grid
//!    origin to that pitch and compute the grid bounds.
//! 5. Count rows and columns from the distinct leading edges.
//! 6. Clamp counts and rescale pixel values to display coordinates.
//!
//! The whole run is synchronous and allocates its own buffers, so a single
//! [`GridDetector`] can be shared across threads.

mod boxes;
mod dimension;
mod error;
mod geometry;
mod params;
mod pipeline;
mod preprocess;
mod result;
pub mod synthetic;

pub use boxes::detect_boxes;
pub use dimension::grid_dimension;
pub use error::DetectError;
pub use geometry::{
    analyze_grid_pattern, find_grid_origin, find_most_common_spacing, grid_bounds_from_cells,
    group_boxes_by_size, median_size, Axis, CellSize, GridPattern,
};
pub use params::{BoxFilterParams, DetectorParams, DimensionParams, GridLimits, SpacingParams};
pub use pipeline::{detect_grid_from_rgba, GridAnalysis, GridDetector};
pub use preprocess::{binarize, preprocess, Binarized};
pub use result::DetectionResult;

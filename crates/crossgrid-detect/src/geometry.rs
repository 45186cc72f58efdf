//! Grid lattice inference from candidate cell boxes.
//!
//! The analysis keeps only the dominant cell size, measures the fundamental
//! center-to-center spacing along each axis, and phase-aligns a lattice of
//! that spacing to the detected centers:
//!
//! 1. greedy size grouping, keep the largest group,
//! 2. per-axis median width/height of that group,
//! 3. re-filter the group to boxes close to the median,
//! 4. smallest plausible consecutive center delta per axis,
//! 5. lattice origin snapped from the top-left-most box,
//! 6. grid bounds from the integer cell index of every box.

use crossgrid_core::{DetectedBox, GridBounds};
use log::{debug, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::params::{DetectorParams, SpacingParams};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Image axis selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    #[inline]
    pub fn center(self, b: &DetectedBox) -> f32 {
        match self {
            Axis::X => b.center.x,
            Axis::Y => b.center.y,
        }
    }

    /// Leading edge (`x` or `y`) of the box.
    #[inline]
    pub fn start(self, b: &DetectedBox) -> u32 {
        match self {
            Axis::X => b.x,
            Axis::Y => b.y,
        }
    }
}

/// Median side lengths of a box set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellSize {
    pub width: u32,
    pub height: u32,
}

/// Output of [`analyze_grid_pattern`], in processing-raster pixels.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridPattern {
    /// Boxes that survived size grouping and median filtering.
    pub boxes: Vec<DetectedBox>,
    /// Median box size of the dominant group.
    pub median_size: CellSize,
    /// Lattice pitch; falls back to the median box size when no spacing is measurable.
    pub cell_width: f32,
    pub cell_height: f32,
    pub bounds: GridBounds,
}

/// `Math.round`-style rounding: halves go towards positive infinity.
#[inline]
pub(crate) fn round_half_up(v: f32) -> f32 {
    (v + 0.5).floor()
}

/// Infer the grid lattice from filtered candidate boxes.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(boxes, params), fields(num_boxes = boxes.len()))
)]
pub fn analyze_grid_pattern(boxes: &[DetectedBox], params: &DetectorParams) -> GridPattern {
    let largest = group_boxes_by_size(boxes, params.size_group_tolerance)
        .into_iter()
        .reduce(|best, g| if g.len() > best.len() { g } else { best })
        .unwrap_or_default();
    let median = median_size(&largest);

    let tol = params.size_filter_tolerance;
    let filtered: Vec<DetectedBox> = largest
        .into_iter()
        .filter(|b| {
            (b.width as f32 - median.width as f32).abs() < median.width as f32 * tol
                && (b.height as f32 - median.height as f32).abs() < median.height as f32 * tol
        })
        .collect();

    let spacing_x = find_most_common_spacing(&filtered, Axis::X, &params.spacing);
    let spacing_y = find_most_common_spacing(&filtered, Axis::Y, &params.spacing);
    if spacing_x == 0.0 || spacing_y == 0.0 {
        warn!(
            "no measurable cell spacing (x={spacing_x}, y={spacing_y}); falling back to median box size {}x{}",
            median.width, median.height
        );
    }
    let cell_width = if spacing_x > 0.0 {
        spacing_x
    } else {
        median.width as f32
    };
    let cell_height = if spacing_y > 0.0 {
        spacing_y
    } else {
        median.height as f32
    };

    let bounds = grid_bounds_from_cells(&filtered, cell_width, cell_height);
    debug!(
        "{} of {} boxes in dominant size group (median {}x{}), pitch {cell_width}x{cell_height}, bounds {bounds:?}",
        filtered.len(),
        boxes.len(),
        median.width,
        median.height
    );

    GridPattern {
        boxes: filtered,
        median_size: median,
        cell_width,
        cell_height,
        bounds,
    }
}

/// Greedy single-pass size clustering.
///
/// Each unused box seeds a group and absorbs every later unused box whose
/// `|dw| + |dh|` is below `tolerance` times the pair's mean side length.
pub fn group_boxes_by_size(boxes: &[DetectedBox], tolerance: f32) -> Vec<Vec<DetectedBox>> {
    let mut used = vec![false; boxes.len()];
    let mut groups = Vec::new();

    for (i, seed) in boxes.iter().enumerate() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let mut group = vec![*seed];

        for (j, other) in boxes.iter().enumerate().skip(i + 1) {
            if used[j] {
                continue;
            }
            let diff = seed.width.abs_diff(other.width) + seed.height.abs_diff(other.height);
            let avg = (seed.width + seed.height + other.width + other.height) as f32 / 4.0;
            if (diff as f32) < avg * tolerance {
                group.push(*other);
                used[j] = true;
            }
        }
        groups.push(group);
    }

    groups
}

/// Upper median (element `len / 2` after sorting) of widths and heights,
/// taken independently.
pub fn median_size(boxes: &[DetectedBox]) -> CellSize {
    if boxes.is_empty() {
        return CellSize::default();
    }
    let mut widths: Vec<u32> = boxes.iter().map(|b| b.width).collect();
    let mut heights: Vec<u32> = boxes.iter().map(|b| b.height).collect();
    widths.sort_unstable();
    heights.sort_unstable();
    CellSize {
        width: widths[widths.len() / 2],
        height: heights[heights.len() / 2],
    }
}

/// Fundamental cell pitch along `axis`, or `0.0` if none is measurable.
///
/// Centers are sorted along the axis; consecutive deltas outside the open
/// interval `(min_spacing, max_spacing)` are discarded, and the smallest
/// survivor is the pitch. Deltas between boxes in the same column are ~0 and
/// drop out; deltas spanning missing cells are integer multiples and lose to
/// the single-cell delta.
pub fn find_most_common_spacing(
    boxes: &[DetectedBox],
    axis: Axis,
    params: &SpacingParams,
) -> f32 {
    let mut centers: Vec<f32> = boxes.iter().map(|b| axis.center(b)).collect();
    centers.sort_by(|a, b| a.total_cmp(b));

    // TODO: a histogram of deltas folded onto multiples of the minimum would
    // give a modal pitch that tolerates a single spurious short delta.
    centers
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|&d| d > params.min_spacing && d < params.max_spacing)
        .reduce(f32::min)
        .unwrap_or(0.0)
}

/// Lattice origin aligned to the top-left-most box (smallest `cx + cy`).
///
/// The box center minus its phase `center mod pitch` gives a candidate
/// corner, which is then snapped to the nearest multiple of the pitch.
pub fn find_grid_origin(
    boxes: &[DetectedBox],
    cell_width: f32,
    cell_height: f32,
) -> Point2<f32> {
    let Some(top_left) = boxes
        .iter()
        .min_by(|a, b| (a.center.x + a.center.y).total_cmp(&(b.center.x + b.center.y)))
    else {
        return Point2::origin();
    };

    let raw_x = top_left.center.x - top_left.center.x % cell_width;
    let raw_y = top_left.center.y - top_left.center.y % cell_height;
    Point2::new(
        round_half_up(raw_x / cell_width) * cell_width,
        round_half_up(raw_y / cell_height) * cell_height,
    )
}

/// Grid extent: from the lattice origin to one pitch past the largest cell
/// index any box center maps to.
pub fn grid_bounds_from_cells(
    boxes: &[DetectedBox],
    cell_width: f32,
    cell_height: f32,
) -> GridBounds {
    if boxes.is_empty() {
        return GridBounds::default();
    }
    let origin = find_grid_origin(boxes, cell_width, cell_height);

    let mut max_col = -1f32;
    let mut max_row = -1f32;
    for b in boxes {
        max_col = max_col.max(round_half_up((b.center.x - origin.x) / cell_width));
        max_row = max_row.max(round_half_up((b.center.y - origin.y) / cell_height));
    }

    GridBounds {
        left: origin.x,
        top: origin.y,
        right: origin.x + (max_col + 1.0) * cell_width,
        bottom: origin.y + (max_row + 1.0) * cell_height,
    }
}

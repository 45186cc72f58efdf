//! Cell-count estimation along one axis.

use crossgrid_core::DetectedBox;

use crate::geometry::{round_half_up, Axis};
use crate::params::DimensionParams;

/// Number of grid cells along `axis` implied by the leading edges of `boxes`.
///
/// Leading edges are sorted and merged into distinct columns (rows) whenever
/// they sit within `merge_fraction * cell_size` of the previous distinct one.
/// If the widest gap between distinct positions is about one pitch, the
/// distinct positions are counted directly; otherwise missing cells are
/// assumed and the count is `round(range / cell_size) + 1`.
///
/// Returns 0 for an empty box set or a non-positive cell size.
pub fn grid_dimension(
    boxes: &[DetectedBox],
    axis: Axis,
    cell_size: f32,
    params: &DimensionParams,
) -> u32 {
    if boxes.is_empty() || cell_size <= 0.0 {
        return 0;
    }

    let mut positions: Vec<u32> = boxes.iter().map(|b| axis.start(b)).collect();
    positions.sort_unstable();

    let merge = cell_size * params.merge_fraction;
    let mut unique: Vec<u32> = Vec::with_capacity(positions.len());
    for &p in &positions {
        match unique.last() {
            Some(&last) if (p - last) as f32 <= merge => {}
            _ => unique.push(p),
        }
    }

    let max_gap = unique
        .windows(2)
        .map(|w| (w[1] - w[0]) as f32)
        .fold(0.0, f32::max);
    let tol = params.regular_gap_tolerance;
    if max_gap > cell_size * (1.0 - tol) && max_gap < cell_size * (1.0 + tol) {
        return unique.len() as u32;
    }

    let range = (positions[positions.len() - 1] - positions[0]) as f32;
    round_half_up(range / cell_size) as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_of(xs: &[u32]) -> Vec<DetectedBox> {
        xs.iter().map(|&x| DetectedBox::new(x, 5, 28, 28)).collect()
    }

    #[test]
    fn regular_positions_are_counted() {
        let boxes = row_of(&[2, 32, 62, 92, 122]);
        assert_eq!(grid_dimension(&boxes, Axis::X, 30.0, &DimensionParams::default()), 5);
    }

    #[test]
    fn jittered_duplicates_merge_into_one_column() {
        // Two rows with 1px jitter per column.
        let boxes = row_of(&[2, 3, 32, 31, 62, 63]);
        assert_eq!(grid_dimension(&boxes, Axis::X, 30.0, &DimensionParams::default()), 3);
    }

    #[test]
    fn gaps_fall_back_to_range() {
        // Columns 2 and 3 missing: max gap is 90, range 150 -> 6 cells.
        let boxes = row_of(&[0, 30, 120, 150]);
        assert_eq!(grid_dimension(&boxes, Axis::X, 30.0, &DimensionParams::default()), 6);
    }

    #[test]
    fn single_position_counts_one() {
        let boxes = row_of(&[40, 40]);
        assert_eq!(grid_dimension(&boxes, Axis::X, 30.0, &DimensionParams::default()), 1);
        assert_eq!(grid_dimension(&boxes, Axis::Y, 30.0, &DimensionParams::default()), 1);
    }

    #[test]
    fn degenerate_inputs_yield_zero() {
        assert_eq!(grid_dimension(&[], Axis::X, 30.0, &DimensionParams::default()), 0);
        let boxes = row_of(&[0, 30]);
        assert_eq!(grid_dimension(&boxes, Axis::X, 0.0, &DimensionParams::default()), 0);
    }
}

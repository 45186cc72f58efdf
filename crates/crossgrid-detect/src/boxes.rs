//! Connected background components -> candidate cell boxes.

use crossgrid_core::{BinaryMask, DetectedBox};
use log::debug;

use crate::params::BoxFilterParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

impl BoxFilterParams {
    /// Whether `b` looks like a single cell interior.
    ///
    /// Bounds are inclusive: a 10x20 box passes a `[0.5, 2.0]` aspect window,
    /// a 10x21 box does not.
    pub fn accepts(&self, b: &DetectedBox) -> bool {
        let aspect = b.aspect_ratio();
        if aspect < self.min_aspect || aspect > self.max_aspect {
            return false;
        }
        if b.width < self.min_size || b.height < self.min_size {
            return false;
        }
        if b.width > self.max_size || b.height > self.max_size {
            return false;
        }
        true
    }
}

/// Scan `mask` in row-major order and return the bounding box of every
/// 4-connected background component accepted by `filter`.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(mask, filter),
        fields(width = mask.width, height = mask.height)
    )
)]
pub fn detect_boxes(mask: &BinaryMask, filter: &BoxFilterParams) -> Vec<DetectedBox> {
    let mut visited = vec![false; mask.data.len()];
    let mut stack = Vec::new();
    let mut boxes = Vec::new();
    let mut components = 0usize;

    for idx in 0..mask.data.len() {
        if visited[idx] || !mask.is_background_idx(idx) {
            continue;
        }
        components += 1;
        let b = flood_fill(mask, &mut visited, &mut stack, idx);
        if filter.accepts(&b) {
            boxes.push(b);
        }
    }

    debug!(
        "{components} background components, {} accepted as cell boxes",
        boxes.len()
    );
    boxes
}

/// Iterative 4-connected fill from `start`, marking `visited` and tracking
/// the component's inclusive bounds.
///
/// `stack` is scratch space reused across calls.
fn flood_fill(
    mask: &BinaryMask,
    visited: &mut [bool],
    stack: &mut Vec<usize>,
    start: usize,
) -> DetectedBox {
    let w = mask.width;
    let h = mask.height;
    let (mut min_x, mut min_y) = (start % w, start / w);
    let (mut max_x, mut max_y) = (min_x, min_y);

    visited[start] = true;
    stack.clear();
    stack.push(start);

    while let Some(idx) = stack.pop() {
        let (x, y) = (idx % w, idx / w);
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);

        let mut visit = |n: usize| {
            if !visited[n] && mask.is_background_idx(n) {
                visited[n] = true;
                stack.push(n);
            }
        };
        if x + 1 < w {
            visit(idx + 1);
        }
        if x > 0 {
            visit(idx - 1);
        }
        if y + 1 < h {
            visit(idx + w);
        }
        if y > 0 {
            visit(idx - w);
        }
    }

    DetectedBox::from_inclusive_bounds(min_x as u32, min_y as u32, max_x as u32, max_y as u32)
}

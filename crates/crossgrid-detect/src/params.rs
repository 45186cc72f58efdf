use serde::{Deserialize, Serialize};

/// Acceptance window for connected components to count as cell candidates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxFilterParams {
    /// Smallest accepted side length in pixels (inclusive).
    pub min_size: u32,
    /// Largest accepted side length in pixels (inclusive).
    pub max_size: u32,
    /// Smallest accepted `width / height` (inclusive).
    pub min_aspect: f32,
    /// Largest accepted `width / height` (inclusive).
    pub max_aspect: f32,
}

impl Default for BoxFilterParams {
    fn default() -> Self {
        Self {
            min_size: 15,
            max_size: 150,
            min_aspect: 0.5,
            max_aspect: 2.0,
        }
    }
}

/// Plausible center-to-center distances between neighbouring cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacingParams {
    /// Deltas must be strictly greater than this.
    pub min_spacing: f32,
    /// Deltas must be strictly less than this.
    pub max_spacing: f32,
}

impl Default for SpacingParams {
    fn default() -> Self {
        Self {
            min_spacing: 10.0,
            max_spacing: 200.0,
        }
    }
}

/// Cell-count estimation along one axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionParams {
    /// Positions closer than `merge_fraction * cell_size` to the previous
    /// distinct position are treated as the same column/row.
    pub merge_fraction: f32,
    /// Relative tolerance for the largest gap to count as "one cell".
    pub regular_gap_tolerance: f32,
}

impl Default for DimensionParams {
    fn default() -> Self {
        Self {
            merge_fraction: 0.5,
            regular_gap_tolerance: 0.2,
        }
    }
}

/// Clamp range for the reported cell counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLimits {
    pub min_cells: u32,
    pub max_cells: u32,
}

impl Default for GridLimits {
    fn default() -> Self {
        Self {
            min_cells: 5,
            max_cells: 25,
        }
    }
}

impl GridLimits {
    pub fn clamp(&self, cells: u32) -> u32 {
        cells.clamp(self.min_cells, self.max_cells.max(self.min_cells))
    }
}

/// All tunables of the grid detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    pub box_filter: BoxFilterParams,
    /// Two boxes share a size group when the summed width and height
    /// difference is below this fraction of their mean side length.
    pub size_group_tolerance: f32,
    /// Boxes of the dominant group are kept when both sides are within this
    /// fraction of the group median.
    pub size_filter_tolerance: f32,
    pub spacing: SpacingParams,
    pub dimension: DimensionParams,
    pub grid_limits: GridLimits,
    /// Longest side of the raster the pipeline runs on; larger images are
    /// downsampled by the loader before detection.
    pub max_process_size: u32,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            box_filter: BoxFilterParams::default(),
            size_group_tolerance: 0.3,
            size_filter_tolerance: 0.2,
            spacing: SpacingParams::default(),
            dimension: DimensionParams::default(),
            grid_limits: GridLimits::default(),
            max_process_size: 800,
        }
    }
}

use serde::{Deserialize, Serialize};

/// Size of the image as shown to the user, in display pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: f32,
    pub height: f32,
}

impl DisplaySize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Geometric description of a crossword grid overlay.
///
/// Pixel fields are in the display coordinate space of the source image.
/// Field names serialize in camelCase so overlay renderers and puzzle-file
/// generators can consume the record unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCalibration {
    /// Number of cells horizontally.
    pub grid_width: u32,
    /// Number of cells vertically.
    pub grid_height: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl Default for GridCalibration {
    /// 15x15 grid of 40 px cells at the image origin.
    fn default() -> Self {
        Self {
            grid_width: 15,
            grid_height: 15,
            cell_width: 40,
            cell_height: 40,
            offset_x: 0,
            offset_y: 0,
        }
    }
}

impl GridCalibration {
    /// Starting point for manual calibration: the whole displayed image split
    /// evenly into `grid_width x grid_height` cells.
    ///
    /// Cell sizes are floored and never drop below one pixel.
    pub fn manual(display: DisplaySize, grid_width: u32, grid_height: u32) -> Self {
        let grid_width = grid_width.max(1);
        let grid_height = grid_height.max(1);
        Self {
            grid_width,
            grid_height,
            cell_width: ((display.width / grid_width as f32).floor() as u32).max(1),
            cell_height: ((display.height / grid_height as f32).floor() as u32).max(1),
            offset_x: 0,
            offset_y: 0,
        }
    }

    /// Display-space rectangle covered by the grid: `(left, top, right, bottom)`.
    pub fn extent(&self) -> (i64, i64, i64, i64) {
        let left = self.offset_x as i64;
        let top = self.offset_y as i64;
        (
            left,
            top,
            left + self.grid_width as i64 * self.cell_width as i64,
            top + self.grid_height as i64 * self.cell_height as i64,
        )
    }

    /// Check a (possibly user-adjusted) calibration against `limits`.
    pub fn validate(&self, limits: &CalibrationLimits) -> Result<(), CalibrationError> {
        let cells = (limits.min_cells as i64, limits.max_cells as i64);
        let size = (limits.min_cell_size as i64, limits.max_cell_size as i64);
        let offset = (0, limits.max_offset as i64);
        check("gridWidth", self.grid_width as i64, cells)?;
        check("gridHeight", self.grid_height as i64, cells)?;
        check("cellWidth", self.cell_width as i64, size)?;
        check("cellHeight", self.cell_height as i64, size)?;
        check("offsetX", self.offset_x as i64, offset)?;
        check("offsetY", self.offset_y as i64, offset)
    }
}

fn check(field: &'static str, value: i64, (min, max): (i64, i64)) -> Result<(), CalibrationError> {
    if value < min || value > max {
        return Err(CalibrationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Accepted ranges for calibration fields edited by hand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationLimits {
    pub min_cells: u32,
    pub max_cells: u32,
    pub min_cell_size: u32,
    pub max_cell_size: u32,
    pub max_offset: u32,
}

impl Default for CalibrationLimits {
    fn default() -> Self {
        Self {
            min_cells: 1,
            max_cells: 50,
            min_cell_size: 10,
            max_cell_size: 100,
            max_offset: 500,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CalibrationError {
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fifteen_square() {
        let c = GridCalibration::default();
        assert_eq!((c.grid_width, c.grid_height), (15, 15));
        assert_eq!((c.cell_width, c.cell_height), (40, 40));
        assert_eq!((c.offset_x, c.offset_y), (0, 0));
    }

    #[test]
    fn manual_floors_cell_size() {
        let c = GridCalibration::manual(DisplaySize::new(610.0, 455.5), 15, 15);
        assert_eq!(c.cell_width, 40);
        assert_eq!(c.cell_height, 30);
        assert_eq!(c.extent(), (0, 0, 600, 450));
    }

    #[test]
    fn manual_guards_zero_cells() {
        let c = GridCalibration::manual(DisplaySize::new(5.0, 5.0), 0, 10);
        assert_eq!(c.grid_width, 1);
        assert_eq!(c.cell_width, 5);
        assert_eq!(c.cell_height, 1);
    }

    #[test]
    fn validate_reports_first_bad_field() {
        let limits = CalibrationLimits::default();
        assert!(GridCalibration::default().validate(&limits).is_ok());

        let c = GridCalibration {
            cell_height: 120,
            offset_x: -3,
            ..GridCalibration::default()
        };
        let err = c.validate(&limits).unwrap_err();
        assert_eq!(
            err,
            CalibrationError::OutOfRange {
                field: "cellHeight",
                value: 120,
                min: 10,
                max: 100
            }
        );
        assert_eq!(err.to_string(), "cellHeight = 120 is outside [10, 100]");
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(GridCalibration::default()).expect("json");
        assert_eq!(json["gridWidth"], 15);
        assert_eq!(json["cellHeight"], 40);
        assert_eq!(json["offsetY"], 0);
    }
}

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box of one candidate cell interior.
///
/// Integer bounds are in processing-raster pixels; `center` is the
/// fractional midpoint `(x + width/2, y + height/2)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectedBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub center: Point2<f32>,
}

impl DetectedBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            center: Point2::new(x as f32 + width as f32 / 2.0, y as f32 + height as f32 / 2.0),
        }
    }

    /// Box spanning the inclusive pixel range `[min_x, max_x] x [min_y, max_y]`.
    pub fn from_inclusive_bounds(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
    }

    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Whether the two boxes share at least one pixel.
    pub fn overlaps(&self, other: &DetectedBox) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Inferred grid extent in processing-raster pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl GridBounds {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn center_is_fractional_midpoint() {
        let b = DetectedBox::from_inclusive_bounds(2, 4, 29, 30);
        assert_eq!((b.width, b.height), (28, 27));
        assert_relative_eq!(b.center.x, 16.0);
        assert_relative_eq!(b.center.y, 17.5);
    }

    #[test]
    fn touching_boxes_do_not_overlap() {
        let a = DetectedBox::new(0, 0, 10, 10);
        let b = DetectedBox::new(10, 0, 10, 10);
        let c = DetectedBox::new(9, 9, 5, 5);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn bounds_extent() {
        let b = GridBounds {
            left: 30.0,
            top: 15.0,
            right: 480.0,
            bottom: 315.0,
        };
        assert_relative_eq!(b.width(), 450.0);
        assert_relative_eq!(b.height(), 300.0);
        assert_relative_eq!(GridBounds::default().width(), 0.0);
    }
}

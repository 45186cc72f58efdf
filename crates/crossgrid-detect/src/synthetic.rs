//! Synthetic crossword grid rasters for tests, benches and demos.

use crossgrid_core::RgbaImage;

/// Axis-aligned grid of `cols x rows` cells with a fixed pitch.
///
/// Gridlines occupy the first `line_width` pixels of every pitch, starting at
/// `origin`; a closing line is drawn after the last cell. Blocked cells are
/// filled with ink like the black squares of a crossword.
#[derive(Clone, Debug)]
pub struct SyntheticGrid {
    pub cols: usize,
    pub rows: usize,
    pub pitch: usize,
    pub line_width: usize,
    pub origin: (usize, usize),
    /// Explicit canvas size; defaults to the grid extent plus origin.
    pub canvas: Option<(usize, usize)>,
    pub blocked: Vec<(usize, usize)>,
    pub ink: u8,
    pub paper: u8,
}

impl SyntheticGrid {
    pub fn new(cols: usize, rows: usize, pitch: usize) -> Self {
        Self {
            cols,
            rows,
            pitch,
            line_width: 2,
            origin: (0, 0),
            canvas: None,
            blocked: Vec::new(),
            ink: 0,
            paper: 255,
        }
    }

    pub fn with_origin(mut self, x: usize, y: usize) -> Self {
        self.origin = (x, y);
        self
    }

    pub fn with_canvas(mut self, width: usize, height: usize) -> Self {
        self.canvas = Some((width, height));
        self
    }

    pub fn with_blocked(mut self, cells: &[(usize, usize)]) -> Self {
        self.blocked.extend_from_slice(cells);
        self
    }

    pub fn with_colors(mut self, ink: u8, paper: u8) -> Self {
        self.ink = ink;
        self.paper = paper;
        self
    }

    pub fn size(&self) -> (usize, usize) {
        self.canvas.unwrap_or((
            self.origin.0 + self.cols * self.pitch + self.line_width,
            self.origin.1 + self.rows * self.pitch + self.line_width,
        ))
    }

    fn is_ink(&self, x: usize, y: usize) -> bool {
        let (Some(rx), Some(ry)) = (x.checked_sub(self.origin.0), y.checked_sub(self.origin.1))
        else {
            return false;
        };
        let extent_x = self.cols * self.pitch + self.line_width;
        let extent_y = self.rows * self.pitch + self.line_width;
        if rx >= extent_x || ry >= extent_y {
            return false;
        }
        if rx % self.pitch < self.line_width || ry % self.pitch < self.line_width {
            return true;
        }
        self.blocked.contains(&(rx / self.pitch, ry / self.pitch))
    }

    pub fn render(&self) -> RgbaImage {
        let (w, h) = self.size();
        RgbaImage::from_fn(w, h, |x, y| {
            let v = if self.is_ink(x, y) { self.ink } else { self.paper };
            [v, v, v, 255]
        })
    }
}

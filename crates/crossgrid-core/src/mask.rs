/// Width x height foreground/background mask, row-major.
///
/// Foreground ([`BinaryMask::FOREGROUND`]) marks dark ink and gridlines;
/// background ([`BinaryMask::BACKGROUND`]) marks open cell interiors and the
/// page around the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl BinaryMask {
    pub const FOREGROUND: u8 = 255;
    pub const BACKGROUND: u8 = 0;

    /// All-background mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![Self::BACKGROUND; width * height],
        }
    }

    /// Build a mask from a predicate returning `true` for foreground pixels.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut is_fg: impl FnMut(usize, usize) -> bool,
    ) -> Self {
        let mut mask = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if is_fg(x, y) {
                    mask.data[y * width + x] = Self::FOREGROUND;
                }
            }
        }
        mask
    }

    #[inline]
    pub fn is_background_idx(&self, idx: usize) -> bool {
        self.data[idx] == Self::BACKGROUND
    }

    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&v| v == Self::FOREGROUND).count()
    }
}

/// Errors raised when wrapping a raw RGBA buffer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageBufferError {
    #[error("invalid image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error("invalid RGBA buffer length (expected {expected} bytes, got {got})")]
    InvalidLength { expected: usize, got: usize },
}

/// Borrowed RGBA8 pixel buffer, row-major, 4 bytes per pixel.
#[derive(Clone, Copy, Debug)]
pub struct RgbaImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // len = 4*w*h
}

/// Owned RGBA8 pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

fn expected_len(width: usize, height: usize) -> Result<usize, ImageBufferError> {
    if width == 0 || height == 0 {
        return Err(ImageBufferError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4))
        .ok_or(ImageBufferError::InvalidDimensions { width, height })
}

impl<'a> RgbaImageView<'a> {
    /// Wrap `data`, checking that it holds exactly `width * height` RGBA pixels.
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Result<Self, ImageBufferError> {
        let expected = expected_len(width, height)?;
        if data.len() != expected {
            return Err(ImageBufferError::InvalidLength {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Sum of the R, G and B channels of pixel `idx` (row-major); alpha is ignored.
    #[inline]
    pub fn channel_sum(&self, idx: usize) -> u16 {
        let i = idx * 4;
        self.data[i] as u16 + self.data[i + 1] as u16 + self.data[i + 2] as u16
    }

    /// Channel mean of pixel `idx`, rounded half up.
    #[inline]
    pub fn gray_rounded(&self, idx: usize) -> u8 {
        ((self.channel_sum(idx) + 1) / 3) as u8
    }
}

impl RgbaImage {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageBufferError> {
        RgbaImageView::new(width, height, &data)?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build an image by evaluating `f(x, y) -> [r, g, b, a]` for every pixel.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> [u8; 4],
    ) -> Self {
        let mut data = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn view(&self) -> RgbaImageView<'_> {
        RgbaImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

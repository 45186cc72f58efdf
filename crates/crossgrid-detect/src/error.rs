use crossgrid_core::ImageBufferError;

/// Errors raised while running grid detection.
///
/// The public entry points never surface these directly; they are folded into
/// [`crate::DetectionResult::Failure`] with the `Display` text as message.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error(transparent)]
    Buffer(#[from] ImageBufferError),

    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("unsupported image format {0}; please upload a JPG or PNG image")]
    UnsupportedFormat(String),

    #[error("image is too small ({width}x{height}); at least {min_width}x{min_height} is required")]
    ImageTooSmall {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },

    #[error("no puzzle boxes detected")]
    NoBoxes,

    #[error("detection worker panicked")]
    WorkerPanicked,
}

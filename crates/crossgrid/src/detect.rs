//! End-to-end detection from encoded images.

use std::io::Cursor;
use std::path::Path;
use std::thread::{self, JoinHandle};

use ::image::imageops::FilterType;
use ::image::{DynamicImage, ImageFormat, ImageReader};
use log::{debug, warn};

use crate::core::{DisplaySize, GridCalibration, RgbaImageView};
use crate::detector::{DetectError, DetectionResult, DetectorParams, GridDetector};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Smallest accepted input image, per side.
pub const MIN_IMAGE_SIDE: u32 = 200;

/// Convert an `image::RgbaImage` into the lightweight `crossgrid-core` view type.
pub fn rgba_view(img: &::image::RgbaImage) -> RgbaImageView<'_> {
    RgbaImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Accept PNG and JPEG only.
pub fn check_format(format: Option<ImageFormat>) -> Result<ImageFormat, DetectError> {
    match format {
        Some(f @ (ImageFormat::Png | ImageFormat::Jpeg)) => Ok(f),
        Some(other) => Err(DetectError::UnsupportedFormat(format!("{other:?}"))),
        None => Err(DetectError::UnsupportedFormat("unknown".to_string())),
    }
}

/// Reject images smaller than [`MIN_IMAGE_SIDE`] on either side.
pub fn check_dimensions(width: u32, height: u32) -> Result<(), DetectError> {
    if width < MIN_IMAGE_SIDE || height < MIN_IMAGE_SIDE {
        return Err(DetectError::ImageTooSmall {
            width,
            height,
            min_width: MIN_IMAGE_SIDE,
            min_height: MIN_IMAGE_SIDE,
        });
    }
    Ok(())
}

fn decode<R: std::io::BufRead + std::io::Seek>(
    reader: ImageReader<R>,
) -> Result<(DynamicImage, ImageFormat), DetectError> {
    let reader = reader.with_guessed_format()?;
    let format = check_format(reader.format())?;
    let img = reader
        .decode()
        .map_err(|e| DetectError::Decode(e.to_string()))?;
    check_dimensions(img.width(), img.height())?;
    debug!("decoded {format:?} image {}x{}", img.width(), img.height());
    Ok((img, format))
}

/// Open, validate and decode an image file.
///
/// The format is sniffed from the file contents, not the extension.
pub fn load_image(path: impl AsRef<Path>) -> Result<(DynamicImage, ImageFormat), DetectError> {
    decode(ImageReader::open(path)?)
}

/// Validate and decode an in-memory encoded image.
pub fn decode_image(bytes: &[u8]) -> Result<(DynamicImage, ImageFormat), DetectError> {
    decode(ImageReader::new(Cursor::new(bytes)))
}

/// Processing raster size: the longest side is at most `max_side`, aspect
/// preserved, sides floored.
pub fn processing_size(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_side || longest == 0 {
        return (width, height);
    }
    let scale = max_side as f64 / longest as f64;
    let w = ((width as f64 * scale).floor() as u32).max(1);
    let h = ((height as f64 * scale).floor() as u32).max(1);
    (w, h)
}

/// Bilinear downscale to the processing resolution, as RGBA8.
pub fn processing_image(img: &DynamicImage, max_side: u32) -> ::image::RgbaImage {
    let (w, h) = processing_size(img.width(), img.height(), max_side);
    if (w, h) == (img.width(), img.height()) {
        return img.to_rgba8();
    }
    debug!(
        "downscaling {}x{} -> {w}x{h} for processing",
        img.width(),
        img.height()
    );
    img.resize_exact(w, h, FilterType::Triangle).to_rgba8()
}

/// Run the detector on a decoded image shown at `display` size.
///
/// Without a display size the default calibration is returned and the image
/// is left untouched. Size and format limits are not applied here; they belong
/// to [`load_image`] and [`decode_image`].
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(img, display, detector),
        fields(width = img.width(), height = img.height())
    )
)]
pub fn detect_grid_with(
    img: &DynamicImage,
    display: Option<DisplaySize>,
    detector: &GridDetector,
) -> Result<GridCalibration, DetectError> {
    if display.is_none() {
        return Ok(GridCalibration::default());
    }
    let raster = processing_image(img, detector.params().max_process_size);
    detector.detect(&rgba_view(&raster), display)
}

/// Detect a grid in a decoded image with default parameters.
pub fn detect_grid(img: &DynamicImage, display: Option<DisplaySize>) -> DetectionResult {
    finish(detect_grid_with(img, display, &GridDetector::default()))
}

/// Load `path` and detect a grid in it with default parameters.
pub fn detect_grid_path(path: impl AsRef<Path>, display: Option<DisplaySize>) -> DetectionResult {
    finish(load_image(path).and_then(|(img, _)| {
        detect_grid_with(&img, display, &GridDetector::default())
    }))
}

/// Decode `bytes` and detect a grid in them with default parameters.
pub fn detect_grid_bytes(bytes: &[u8], display: Option<DisplaySize>) -> DetectionResult {
    finish(decode_image(bytes).and_then(|(img, _)| {
        detect_grid_with(&img, display, &GridDetector::default())
    }))
}

fn finish(res: Result<GridCalibration, DetectError>) -> DetectionResult {
    if let Err(err) = &res {
        warn!("grid detection failed: {err}");
    }
    res.into()
}

/// Detection running on a worker thread.
#[derive(Debug)]
pub struct DetectHandle {
    inner: JoinHandle<DetectionResult>,
}

impl DetectHandle {
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Wait for the worker. A panic inside it becomes a failure result.
    pub fn join(self) -> DetectionResult {
        self.inner
            .join()
            .unwrap_or_else(|_| finish(Err(DetectError::WorkerPanicked)))
    }
}

/// Run a detection on a background thread so the caller stays responsive.
pub fn spawn_detect_grid(
    img: DynamicImage,
    display: Option<DisplaySize>,
    params: DetectorParams,
) -> DetectHandle {
    let inner = thread::spawn(move || {
        let detector = GridDetector::new(params);
        finish(detect_grid_with(&img, display, &detector))
    });
    DetectHandle { inner }
}

//! RGBA -> binary mask via a global Otsu threshold.

use crossgrid_core::{gray_histogram, otsu_threshold, BinaryMask, RgbaImageView};
use log::debug;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Mask plus the threshold it was cut at.
#[derive(Clone, Debug)]
pub struct Binarized {
    pub mask: BinaryMask,
    pub threshold: u8,
}

/// Binarize `img` with Otsu's threshold over its channel-mean histogram.
///
/// Pixels darker than the threshold become foreground (gridlines, ink),
/// everything else background (cell interiors, page).
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(img), fields(width = img.width, height = img.height))
)]
pub fn preprocess(img: &RgbaImageView<'_>) -> Binarized {
    let hist = gray_histogram(img);
    let threshold = otsu_threshold(&hist);
    let mask = binarize(img, threshold);
    debug!(
        "otsu threshold {threshold}, {} of {} pixels foreground",
        mask.foreground_count(),
        img.pixel_count()
    );
    Binarized { mask, threshold }
}

/// Foreground where the unrounded channel mean is strictly below `threshold`.
pub fn binarize(img: &RgbaImageView<'_>, threshold: u8) -> BinaryMask {
    // mean < t  <=>  r + g + b < 3t
    let limit = threshold as u16 * 3;
    let data = (0..img.pixel_count())
        .map(|idx| {
            if img.channel_sum(idx) < limit {
                BinaryMask::FOREGROUND
            } else {
                BinaryMask::BACKGROUND
            }
        })
        .collect();
    BinaryMask {
        width: img.width,
        height: img.height,
        data,
    }
}

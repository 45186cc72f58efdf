//! Global intensity thresholding.

use crate::RgbaImageView;

/// 256-bucket histogram of rounded channel-mean intensities.
pub type GrayHistogram = [u32; 256];

/// Histogram of `round((r + g + b) / 3)` over every pixel of `img`.
pub fn gray_histogram(img: &RgbaImageView<'_>) -> GrayHistogram {
    let mut hist = [0u32; 256];
    for idx in 0..img.pixel_count() {
        hist[img.gray_rounded(idx) as usize] += 1;
    }
    hist
}

/// Otsu's threshold over a gray histogram.
///
/// The split `[0, t] | (t, 255]` maximizing the between-class variance
/// `w_b * w_f * (m_b - m_f)^2` is found, and `t + 1` is returned: the first
/// level of the bright class. A strict `gray < threshold` test therefore
/// selects exactly the dark class.
///
/// An empty histogram yields 127; a single occupied level `v` yields `v`
/// (nothing is darker than the threshold).
pub fn otsu_threshold(hist: &GrayHistogram) -> u8 {
    let total: u64 = hist.iter().map(|&h| h as u64).sum();
    if total == 0 {
        return 127;
    }
    let occupied = hist.iter().filter(|&&h| h > 0).count();
    if occupied == 1 {
        return hist.iter().position(|&h| h > 0).unwrap_or(0) as u8;
    }

    let total = total as f64;
    let sum_total: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &h)| i as f64 * h as f64)
        .sum();

    let mut sum_b = 0f64;
    let mut w_b = 0f64;
    let mut best_var = 0f64;
    let mut best_t = 0u8;

    for (t, &h) in hist.iter().enumerate() {
        w_b += h as f64;
        if w_b == 0.0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f == 0.0 {
            break;
        }

        sum_b += t as f64 * h as f64;
        let m_b = sum_b / w_b;
        let m_f = (sum_total - sum_b) / w_f;

        let var_between = w_b * w_f * (m_b - m_f) * (m_b - m_f);
        if var_between > best_var {
            best_var = var_between;
            best_t = t as u8;
        }
    }

    best_t.saturating_add(1)
}

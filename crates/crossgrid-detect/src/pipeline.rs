use crossgrid_core::{DisplaySize, GridCalibration, RgbaImageView};
use log::{debug, warn};
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::boxes::detect_boxes;
use crate::dimension::grid_dimension;
use crate::geometry::{analyze_grid_pattern, round_half_up, Axis, GridPattern};
use crate::params::DetectorParams;
use crate::preprocess::preprocess;
use crate::{DetectError, DetectionResult};

/// Intermediate results of one detection run, in processing-raster pixels.
#[derive(Clone, Debug, Serialize)]
pub struct GridAnalysis {
    /// Size of the raster the pipeline ran on.
    pub width: usize,
    pub height: usize,
    pub threshold: u8,
    /// Boxes accepted by the shape filter, before size grouping.
    pub num_candidates: usize,
    pub pattern: GridPattern,
    /// Cell counts before clamping.
    pub raw_grid_width: u32,
    pub raw_grid_height: u32,
}

/// Crossword grid detector: binarize -> cell boxes -> lattice -> calibration.
///
/// The detector holds only its parameters; every call allocates its own
/// buffers, so one detector can serve concurrent calls.
#[derive(Clone, Debug, Default)]
pub struct GridDetector {
    params: DetectorParams,
}

impl GridDetector {
    pub fn new(params: DetectorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    /// Run the pixel stages and lattice inference on `img`.
    ///
    /// Fails with [`DetectError::NoBoxes`] when no component passes the box
    /// filter; sparse geometry falls back to median box sizes instead.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, img), fields(width = img.width, height = img.height))
    )]
    pub fn analyze(&self, img: &RgbaImageView<'_>) -> Result<GridAnalysis, DetectError> {
        let binarized = preprocess(img);
        let boxes = detect_boxes(&binarized.mask, &self.params.box_filter);
        if boxes.is_empty() {
            return Err(DetectError::NoBoxes);
        }

        let pattern = analyze_grid_pattern(&boxes, &self.params);
        let raw_grid_width = grid_dimension(
            &pattern.boxes,
            Axis::X,
            pattern.cell_width,
            &self.params.dimension,
        );
        let raw_grid_height = grid_dimension(
            &pattern.boxes,
            Axis::Y,
            pattern.cell_height,
            &self.params.dimension,
        );
        debug!("raw grid estimate {raw_grid_width}x{raw_grid_height} cells");

        Ok(GridAnalysis {
            width: img.width,
            height: img.height,
            threshold: binarized.threshold,
            num_candidates: boxes.len(),
            pattern,
            raw_grid_width,
            raw_grid_height,
        })
    }

    /// Clamp cell counts and rescale pixel quantities from the processing
    /// raster to `display` coordinates.
    pub fn calibrate(&self, analysis: &GridAnalysis, display: DisplaySize) -> GridCalibration {
        let sx = display.width / analysis.width as f32;
        let sy = display.height / analysis.height as f32;
        let p = &analysis.pattern;
        let limits = self.params.grid_limits;

        GridCalibration {
            grid_width: limits.clamp(analysis.raw_grid_width),
            grid_height: limits.clamp(analysis.raw_grid_height),
            cell_width: (round_half_up(p.cell_width * sx) as u32).max(1),
            cell_height: (round_half_up(p.cell_height * sy) as u32).max(1),
            offset_x: round_half_up(p.bounds.left * sx) as i32,
            offset_y: round_half_up(p.bounds.top * sy) as i32,
        }
    }

    /// Detect a calibration for `img` shown at `display` size.
    ///
    /// Without a display size the pixels are not inspected and
    /// [`GridCalibration::default`] is returned.
    pub fn detect(
        &self,
        img: &RgbaImageView<'_>,
        display: Option<DisplaySize>,
    ) -> Result<GridCalibration, DetectError> {
        let Some(display) = display else {
            return Ok(GridCalibration::default());
        };
        let analysis = self.analyze(img)?;
        Ok(self.calibrate(&analysis, display))
    }

    /// Like [`GridDetector::detect`], with errors folded into the result.
    pub fn detect_result(
        &self,
        img: &RgbaImageView<'_>,
        display: Option<DisplaySize>,
    ) -> DetectionResult {
        let res = self.detect(img, display);
        if let Err(err) = &res {
            warn!("grid detection failed: {err}");
        }
        res.into()
    }
}

/// Detect a grid in a raw RGBA8 buffer with default parameters.
///
/// Never fails: buffer validation errors and detection failures are both
/// reported as [`DetectionResult::Failure`].
pub fn detect_grid_from_rgba(
    width: usize,
    height: usize,
    rgba: &[u8],
    display: Option<DisplaySize>,
) -> DetectionResult {
    if display.is_none() {
        return DetectionResult::Success {
            calibration: GridCalibration::default(),
        };
    }
    match RgbaImageView::new(width, height, rgba) {
        Ok(view) => GridDetector::default().detect_result(&view, display),
        Err(err) => {
            warn!("rejecting RGBA buffer: {err}");
            DetectionResult::from(Err(DetectError::from(err)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::SyntheticGrid;
    use crossgrid_core::RgbaImage;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn display_of(img: &RgbaImage) -> Option<DisplaySize> {
        Some(DisplaySize::new(img.width as f32, img.height as f32))
    }

    fn calibrate(img: &RgbaImage, display: Option<DisplaySize>) -> GridCalibration {
        GridDetector::default()
            .detect(&img.view(), display)
            .expect("detection")
    }

    #[test]
    fn detects_fifteen_by_fifteen_grid() {
        init_logs();
        let img = SyntheticGrid::new(15, 15, 30).with_canvas(450, 450).render();
        let c = calibrate(&img, display_of(&img));
        assert_eq!((c.grid_width, c.grid_height), (15, 15));
        assert!(c.cell_width.abs_diff(30) <= 1, "{c:?}");
        assert!(c.cell_height.abs_diff(30) <= 1, "{c:?}");
        assert!(c.offset_x.abs() <= 1 && c.offset_y.abs() <= 1, "{c:?}");
    }

    #[test]
    fn rescales_to_display_coordinates() {
        let img = SyntheticGrid::new(10, 10, 30)
            .with_origin(60, 30)
            .with_canvas(800, 600)
            .render();
        let c = calibrate(&img, Some(DisplaySize::new(2000.0, 1500.0)));
        assert_eq!(
            c,
            GridCalibration {
                grid_width: 10,
                grid_height: 10,
                cell_width: 75,
                cell_height: 75,
                offset_x: 150,
                offset_y: 75,
            }
        );
    }

    #[test]
    fn small_grid_clamps_up() {
        let img = SyntheticGrid::new(3, 3, 30).render();
        let detector = GridDetector::default();
        let analysis = detector.analyze(&img.view()).expect("analysis");
        assert_eq!(analysis.raw_grid_width, 3);
        let c = detector.calibrate(&analysis, display_of(&img).expect("display"));
        assert_eq!((c.grid_width, c.grid_height), (5, 5));
        assert_eq!(c.cell_width, 30);
    }

    #[test]
    fn wide_grid_clamps_down() {
        let img = SyntheticGrid::new(40, 6, 20).render();
        let detector = GridDetector::default();
        let analysis = detector.analyze(&img.view()).expect("analysis");
        assert_eq!(analysis.raw_grid_width, 40);
        assert_eq!(analysis.raw_grid_height, 6);
        let c = detector.calibrate(&analysis, display_of(&img).expect("display"));
        assert_eq!((c.grid_width, c.grid_height), (25, 6));
        assert_eq!((c.cell_width, c.cell_height), (20, 20));
    }

    #[test]
    fn blocked_squares_and_page_margin_are_tolerated() {
        init_logs();
        let img = SyntheticGrid::new(15, 15, 30)
            .with_origin(30, 30)
            .with_blocked(&[(4, 4), (7, 2), (10, 12), (14, 0)])
            .with_colors(40, 230)
            .render();
        let detector = GridDetector::default();
        let analysis = detector.analyze(&img.view()).expect("analysis");
        assert_eq!(analysis.pattern.boxes.len(), 225 - 4);
        let c = detector.calibrate(&analysis, display_of(&img).expect("display"));
        assert_eq!((c.grid_width, c.grid_height), (15, 15));
        assert_eq!((c.cell_width, c.cell_height), (30, 30));
        assert_eq!((c.offset_x, c.offset_y), (30, 30));
    }

    #[test]
    fn blank_image_fails_without_panicking() {
        init_logs();
        let img = RgbaImage::from_fn(200, 200, |_, _| [255, 255, 255, 255]);
        let res = GridDetector::default().detect_result(&img.view(), display_of(&img));
        assert!(!res.is_success());
        assert_eq!(res.error(), Some("no puzzle boxes detected"));
    }

    #[test]
    fn missing_display_returns_default_without_processing() {
        let res = detect_grid_from_rgba(0, 0, &[], None);
        assert_eq!(res.calibration(), Some(&GridCalibration::default()));
    }

    #[test]
    fn bad_buffer_is_reported_as_failure() {
        let res = detect_grid_from_rgba(10, 10, &[0u8; 12], Some(DisplaySize::new(10.0, 10.0)));
        let msg = res.error().expect("failure");
        assert!(msg.contains("expected 400 bytes"), "{msg}");
    }

    #[test]
    fn detection_is_deterministic() {
        let img = SyntheticGrid::new(12, 9, 26)
            .with_origin(13, 26)
            .with_blocked(&[(3, 3), (8, 5)])
            .render();
        let display = display_of(&img);
        let first = detect_grid_from_rgba(img.width, img.height, &img.data, display);
        let second = detect_grid_from_rgba(img.width, img.height, &img.data, display);
        assert!(first.is_success());
        assert_eq!(first, second);
    }
}

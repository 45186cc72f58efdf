use crossgrid_core::{DisplaySize, GridCalibration};
use serde::{Deserialize, Serialize};

use crate::DetectError;

/// All-or-nothing outcome of a detection run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DetectionResult {
    Success { calibration: GridCalibration },
    Failure { error: String },
}

impl DetectionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, DetectionResult::Success { .. })
    }

    pub fn calibration(&self) -> Option<&GridCalibration> {
        match self {
            DetectionResult::Success { calibration } => Some(calibration),
            DetectionResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            DetectionResult::Success { .. } => None,
            DetectionResult::Failure { error } => Some(error),
        }
    }

    /// The detected calibration, or an even 15x15 split of `display` to seed
    /// manual calibration.
    pub fn or_manual(&self, display: DisplaySize) -> GridCalibration {
        match self {
            DetectionResult::Success { calibration } => *calibration,
            DetectionResult::Failure { .. } => GridCalibration::manual(display, 15, 15),
        }
    }
}

impl From<Result<GridCalibration, DetectError>> for DetectionResult {
    fn from(res: Result<GridCalibration, DetectError>) -> Self {
        match res {
            Ok(calibration) => DetectionResult::Success { calibration },
            Err(err) => DetectionResult::Failure {
                error: err.to_string(),
            },
        }
    }
}

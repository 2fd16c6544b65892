//! Calibration validation: how far gaze lands from known targets.
//!
//! Error is averaged per target first, then across targets, so a target with
//! more samples does not outweigh the others.

use std::fmt;

use crate::fixation::radius_from_calibration_error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl CalibrationQuality {
    pub fn from_error(average_error_px: f64) -> Self {
        if average_error_px < 75.0 {
            CalibrationQuality::Excellent
        } else if average_error_px < 125.0 {
            CalibrationQuality::Good
        } else if average_error_px < 200.0 {
            CalibrationQuality::Fair
        } else {
            CalibrationQuality::Poor
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CalibrationQuality::Excellent => "excellent",
            CalibrationQuality::Good => "good",
            CalibrationQuality::Fair => "fair",
            CalibrationQuality::Poor => "poor",
        }
    }
}

impl fmt::Display for CalibrationQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One gaze estimate taken while the user looked at a known target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationPoint {
    pub target_x: f64,
    pub target_y: f64,
    pub gaze_x: f64,
    pub gaze_y: f64,
}

impl ValidationPoint {
    #[inline]
    pub fn error_px(&self) -> f64 {
        (self.gaze_x - self.target_x).hypot(self.gaze_y - self.target_y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetError {
    pub target_x: f64,
    pub target_y: f64,
    pub samples: usize,
    pub average_error_px: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationReport {
    pub average_error_px: f64,
    pub quality: CalibrationQuality,
    /// Per target, in order of first appearance.
    pub targets: Vec<TargetError>,
}

impl CalibrationReport {
    /// `None` when there are no finite points to judge.
    pub fn from_points(points: &[ValidationPoint]) -> Option<Self> {
        let mut acc: Vec<(f64, f64, f64, usize)> = Vec::new();
        for p in points {
            let err = p.error_px();
            if !err.is_finite() {
                continue;
            }
            match acc
                .iter_mut()
                .find(|(tx, ty, _, _)| *tx == p.target_x && *ty == p.target_y)
            {
                Some((_, _, sum, n)) => {
                    *sum += err;
                    *n += 1;
                }
                None => acc.push((p.target_x, p.target_y, err, 1)),
            }
        }
        if acc.is_empty() {
            return None;
        }

        let targets: Vec<TargetError> = acc
            .into_iter()
            .map(|(target_x, target_y, sum, n)| TargetError {
                target_x,
                target_y,
                samples: n,
                average_error_px: sum / n as f64,
            })
            .collect();
        let average_error_px =
            targets.iter().map(|t| t.average_error_px).sum::<f64>() / targets.len() as f64;

        Some(Self {
            average_error_px,
            quality: CalibrationQuality::from_error(average_error_px),
            targets,
        })
    }

    /// Fixation radius this calibration calls for.
    pub fn fixation_radius_px(&self) -> f64 {
        radius_from_calibration_error(Some(self.average_error_px))
    }
}

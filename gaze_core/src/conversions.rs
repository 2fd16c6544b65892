//! `From` implementations bridging `gaze_config` types to `gaze_core` types.

use crate::calibration::ValidationPoint;
use crate::config::{
    DriftCfg, FixationCfg, OutlierCfg, SessionCfg, SmoothingCfg, TrackingCfg, Viewport,
};
use crate::layout::RectLayout;
use gaze_traits::GazeSample;

// ── SmoothingCfg ─────────────────────────────────────────────────────────────

impl From<&gaze_config::SmoothingCfg> for SmoothingCfg {
    fn from(c: &gaze_config::SmoothingCfg) -> Self {
        Self {
            min_cutoff: c.min_cutoff,
            beta: c.beta,
            d_cutoff: c.d_cutoff,
            base_freq_hz: c.base_freq_hz,
        }
    }
}

// ── OutlierCfg ───────────────────────────────────────────────────────────────

impl From<&gaze_config::OutlierCfg> for OutlierCfg {
    fn from(c: &gaze_config::OutlierCfg) -> Self {
        Self {
            window: c.window,
            warmup: c.warmup,
            z_threshold: c.z_threshold,
            min_std_px: c.min_std_px,
        }
    }
}

// ── FixationCfg ──────────────────────────────────────────────────────────────

impl From<&gaze_config::FixationCfg> for FixationCfg {
    fn from(c: &gaze_config::FixationCfg) -> Self {
        Self {
            radius_px: c.radius_px,
            min_duration_ms: c.min_duration_ms,
        }
    }
}

// ── TrackingCfg ──────────────────────────────────────────────────────────────

impl From<&gaze_config::TrackingCfg> for TrackingCfg {
    fn from(c: &gaze_config::TrackingCfg) -> Self {
        Self {
            read_threshold_ms: c.read_threshold_ms,
        }
    }
}

// ── DriftCfg / Viewport ──────────────────────────────────────────────────────

impl From<&gaze_config::DriftCfg> for DriftCfg {
    fn from(c: &gaze_config::DriftCfg) -> Self {
        Self {
            window_ms: c.window_ms,
            check_interval_ms: c.check_interval_ms,
            no_data_ms: c.no_data_ms,
            margin_px: c.margin_px,
            off_screen_ratio: c.off_screen_ratio,
            min_samples: c.min_samples,
        }
    }
}

impl From<&gaze_config::ViewportCfg> for Viewport {
    fn from(c: &gaze_config::ViewportCfg) -> Self {
        Self::new(c.width, c.height)
    }
}

// ── SessionCfg ───────────────────────────────────────────────────────────────

impl From<&gaze_config::Config> for SessionCfg {
    fn from(c: &gaze_config::Config) -> Self {
        Self {
            smoothing: (&c.smoothing).into(),
            outlier: (&c.outlier).into(),
            fixation: (&c.fixation).into(),
            tracking: (&c.tracking).into(),
            drift: (&c.drift).into(),
            viewport: (&c.viewport).into(),
            calibration_error_px: c.calibration.average_error_px,
        }
    }
}

// ── CSV rows ─────────────────────────────────────────────────────────────────

#[inline]
pub fn sample_from_row(r: &gaze_config::TraceRow) -> GazeSample {
    GazeSample::new(r.x, r.y, r.timestamp_ms)
}

pub fn samples_from_rows(rows: &[gaze_config::TraceRow]) -> Vec<GazeSample> {
    rows.iter().map(sample_from_row).collect()
}

impl From<&gaze_config::ValidationRow> for ValidationPoint {
    fn from(r: &gaze_config::ValidationRow) -> Self {
        Self {
            target_x: r.target_x,
            target_y: r.target_y,
            gaze_x: r.gaze_x,
            gaze_y: r.gaze_y,
        }
    }
}

impl From<&[gaze_config::LayoutRow]> for RectLayout {
    fn from(rows: &[gaze_config::LayoutRow]) -> Self {
        let mut layout = RectLayout::new();
        for r in rows {
            layout.push(r.id.as_str(), r.page, r.x, r.y, r.width, r.height);
        }
        layout
    }
}

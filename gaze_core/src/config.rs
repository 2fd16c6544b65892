//! Runtime configuration for the gaze pipeline.
//!
//! These are the structs consumed by the pipeline stages and `ReadingSession`.
//! They are separate from the TOML-deserialized config in `gaze_config`;
//! see `conversions` for the mapping.

/// Adaptive (One-Euro) smoothing parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingCfg {
    /// Cutoff (Hz) used when the gaze is still.
    pub min_cutoff: f64,
    /// Cutoff gain per unit of estimated speed.
    pub beta: f64,
    /// Fixed cutoff (Hz) for the derivative estimate.
    pub d_cutoff: f64,
    /// Sampling frequency assumed until a second timestamp arrives.
    pub base_freq_hz: f64,
}

impl Default for SmoothingCfg {
    fn default() -> Self {
        Self {
            min_cutoff: 1.5,
            beta: 0.01,
            d_cutoff: 1.0,
            base_freq_hz: 30.0,
        }
    }
}

/// Outlier rejection over a window of accepted samples.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierCfg {
    /// Window capacity (FIFO).
    pub window: usize,
    /// Accept unconditionally until this many samples have been accepted.
    pub warmup: usize,
    /// Reject when either axis z-score exceeds this.
    pub z_threshold: f64,
    /// Lower bound for each axis standard deviation (px).
    pub min_std_px: f64,
}

impl Default for OutlierCfg {
    fn default() -> Self {
        Self {
            window: 20,
            warmup: 5,
            z_threshold: 3.0,
            min_std_px: 10.0,
        }
    }
}

/// Dispersion clustering parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FixationCfg {
    /// Cluster radius in pixels. Clamped to `[MIN_RADIUS_PX, MAX_RADIUS_PX]`.
    pub radius_px: f64,
    /// Shorter clusters are discarded.
    pub min_duration_ms: f64,
}

impl Default for FixationCfg {
    fn default() -> Self {
        Self {
            radius_px: 50.0,
            min_duration_ms: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackingCfg {
    /// Dwell needed before a span is read.
    pub read_threshold_ms: f64,
}

impl Default for TrackingCfg {
    fn default() -> Self {
        Self {
            read_threshold_ms: 250.0,
        }
    }
}

/// Drift/loss watchdog parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftCfg {
    /// Trailing window of raw samples kept for the off-screen ratio.
    pub window_ms: f64,
    /// Cadence of the periodic check.
    pub check_interval_ms: f64,
    /// Silence longer than this reports `Lost`.
    pub no_data_ms: f64,
    /// Tolerance around the viewport before a sample counts as off-screen.
    pub margin_px: f64,
    /// Off-screen fraction above which `Warning` is reported.
    pub off_screen_ratio: f64,
    /// Minimum windowed samples needed to judge drift.
    pub min_samples: usize,
}

impl Default for DriftCfg {
    fn default() -> Self {
        Self {
            window_ms: 10_000.0,
            check_interval_ms: 5_000.0,
            no_data_ms: 3_000.0,
            margin_px: 50.0,
            off_screen_ratio: 0.4,
            min_samples: 10,
        }
    }
}

/// Visible screen area in the same units as gaze samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when the point lies inside the viewport grown by `margin` on every side.
    #[inline]
    pub fn contains_with_margin(&self, x: f64, y: f64, margin: f64) -> bool {
        x >= -margin && x <= self.width + margin && y >= -margin && y <= self.height + margin
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

/// Everything a `ReadingSession` is configured with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionCfg {
    pub smoothing: SmoothingCfg,
    pub outlier: OutlierCfg,
    pub fixation: FixationCfg,
    pub tracking: TrackingCfg,
    pub drift: DriftCfg,
    pub viewport: Viewport,
    /// Average calibration error (px). When set it overrides `fixation.radius_px`.
    pub calibration_error_px: Option<f64>,
}

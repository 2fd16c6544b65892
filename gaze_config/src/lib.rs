#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and CSV loaders for the gaze read-verification pipeline.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//!   Every section is optional; missing keys fall back to the pipeline defaults.
//! - CSV loaders enforce exact headers for recorded gaze traces, span layouts
//!   and calibration validation samples.
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SmoothingCfg {
    /// Minimum cutoff frequency (Hz) of the adaptive low-pass filter.
    pub min_cutoff: f64,
    /// Speed coefficient; larger values reduce lag during fast motion.
    pub beta: f64,
    /// Cutoff (Hz) used to smooth the derivative estimate.
    pub d_cutoff: f64,
    /// Sampling frequency assumed before two timestamps are known.
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

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutlierCfg {
    /// Capacity of the accepted-sample window.
    pub window: usize,
    /// Samples accepted unconditionally before z-scoring starts.
    pub warmup: usize,
    pub z_threshold: f64,
    /// Floor applied to each axis standard deviation (px).
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

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FixationCfg {
    pub radius_px: f64,
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

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrackingCfg {
    /// Dwell time (ms) after which a span counts as read.
    pub read_threshold_ms: f64,
}

impl Default for TrackingCfg {
    fn default() -> Self {
        Self {
            read_threshold_ms: 250.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DriftCfg {
    pub window_ms: f64,
    pub check_interval_ms: f64,
    /// Report tracking loss after this long without a sample.
    pub no_data_ms: f64,
    pub margin_px: f64,
    /// Fraction of off-screen samples above which drift is reported.
    pub off_screen_ratio: f64,
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

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ViewportCfg {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportCfg {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CalibrationCfg {
    /// Average validation error (px) of the current calibration, if known.
    pub average_error_px: Option<f64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub smoothing: SmoothingCfg,
    pub outlier: OutlierCfg,
    pub fixation: FixationCfg,
    pub tracking: TrackingCfg,
    pub drift: DriftCfg,
    pub viewport: ViewportCfg,
    pub calibration: CalibrationCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a TOML config file, then validate it.
pub fn load_config_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration: {e}"))?;
    cfg.validate()?;
    Ok(cfg)
}

#[inline]
fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Smoothing
        if !positive(self.smoothing.min_cutoff) {
            eyre::bail!("smoothing.min_cutoff must be > 0");
        }
        if !(self.smoothing.beta.is_finite() && self.smoothing.beta >= 0.0) {
            eyre::bail!("smoothing.beta must be >= 0");
        }
        if !positive(self.smoothing.d_cutoff) {
            eyre::bail!("smoothing.d_cutoff must be > 0");
        }
        if !positive(self.smoothing.base_freq_hz) {
            eyre::bail!("smoothing.base_freq_hz must be > 0");
        }

        // Outlier
        if self.outlier.window == 0 {
            eyre::bail!("outlier.window must be >= 1");
        }
        if self.outlier.warmup > self.outlier.window {
            eyre::bail!("outlier.warmup must not exceed outlier.window");
        }
        if !positive(self.outlier.z_threshold) {
            eyre::bail!("outlier.z_threshold must be > 0");
        }
        if !positive(self.outlier.min_std_px) {
            eyre::bail!("outlier.min_std_px must be > 0");
        }

        // Fixation (radius is clamped at runtime; only reject nonsense here)
        if !positive(self.fixation.radius_px) {
            eyre::bail!("fixation.radius_px must be > 0");
        }
        if !(self.fixation.min_duration_ms.is_finite() && self.fixation.min_duration_ms >= 0.0) {
            eyre::bail!("fixation.min_duration_ms must be >= 0");
        }

        // Tracking
        if !positive(self.tracking.read_threshold_ms) {
            eyre::bail!("tracking.read_threshold_ms must be > 0");
        }

        // Drift
        if !positive(self.drift.window_ms) {
            eyre::bail!("drift.window_ms must be > 0");
        }
        if !positive(self.drift.check_interval_ms) {
            eyre::bail!("drift.check_interval_ms must be > 0");
        }
        if !positive(self.drift.no_data_ms) {
            eyre::bail!("drift.no_data_ms must be > 0");
        }
        if !(self.drift.margin_px.is_finite() && self.drift.margin_px >= 0.0) {
            eyre::bail!("drift.margin_px must be >= 0");
        }
        if !(self.drift.off_screen_ratio > 0.0 && self.drift.off_screen_ratio <= 1.0) {
            eyre::bail!("drift.off_screen_ratio must be in (0.0, 1.0]");
        }
        if self.drift.min_samples == 0 {
            eyre::bail!("drift.min_samples must be >= 1");
        }

        // Viewport
        if !positive(self.viewport.width) || !positive(self.viewport.height) {
            eyre::bail!("viewport.width and viewport.height must be > 0");
        }

        // Calibration
        if let Some(err) = self.calibration.average_error_px
            && !(err.is_finite() && err >= 0.0)
        {
            eyre::bail!("calibration.average_error_px must be >= 0");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}

/// Recorded gaze trace row.
///
/// Expected headers:
/// timestamp_ms,x,y
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct TraceRow {
    pub timestamp_ms: f64,
    pub x: f64,
    pub y: f64,
}

/// Span layout row: one rendered text span and its bounding rectangle.
///
/// Expected headers:
/// id,page,x,y,width,height
#[derive(Debug, Deserialize, Clone)]
pub struct LayoutRow {
    pub id: String,
    pub page: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Calibration validation row: one gaze estimate taken while the user looked
/// at a known target.
///
/// Expected headers:
/// target_x,target_y,gaze_x,gaze_y
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ValidationRow {
    pub target_x: f64,
    pub target_y: f64,
    pub gaze_x: f64,
    pub gaze_y: f64,
}

/// Open a CSV file, enforce its exact header row, and deserialize every record.
fn load_csv<T: serde::de::DeserializeOwned>(
    path: &Path,
    what: &str,
    expected: &[&str],
) -> eyre::Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open {} CSV {:?}: {}", what, path, e))?;

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "{} CSV must have headers '{}', got: {}",
            what,
            expected.join(","),
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<T>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid {} CSV row {}: {}", what, idx + 2, e);
            }
        }
    }
    Ok(rows)
}

/// Load a recorded gaze trace. Non-finite coordinates are kept; the pipeline drops them.
pub fn load_trace_csv(path: &Path) -> eyre::Result<Vec<TraceRow>> {
    let rows: Vec<TraceRow> = load_csv(path, "trace", &["timestamp_ms", "x", "y"])?;
    for (i, pair) in rows.windows(2).enumerate() {
        if pair[1].timestamp_ms < pair[0].timestamp_ms {
            eyre::bail!(
                "trace timestamps must be non-decreasing (row {} goes back in time)",
                i + 3
            );
        }
    }
    Ok(rows)
}

/// Load a span layout. Span ids must be unique and rectangles non-negative.
pub fn load_layout_csv(path: &Path) -> eyre::Result<Vec<LayoutRow>> {
    let rows: Vec<LayoutRow> =
        load_csv(path, "layout", &["id", "page", "x", "y", "width", "height"])?;
    let mut seen = std::collections::HashSet::new();
    for (i, row) in rows.iter().enumerate() {
        if row.id.is_empty() {
            eyre::bail!("layout row {} has an empty span id", i + 2);
        }
        if !seen.insert(row.id.as_str()) {
            eyre::bail!("layout span id {:?} is duplicated", row.id);
        }
        if !(row.width >= 0.0 && row.height >= 0.0) {
            eyre::bail!("layout span {:?} has a negative size", row.id);
        }
    }
    Ok(rows)
}

/// Load calibration validation samples.
pub fn load_validation_csv(path: &Path) -> eyre::Result<Vec<ValidationRow>> {
    let rows: Vec<ValidationRow> = load_csv(
        path,
        "validation",
        &["target_x", "target_y", "gaze_x", "gaze_y"],
    )?;
    if rows.is_empty() {
        eyre::bail!("validation CSV contains no samples");
    }
    Ok(rows)
}

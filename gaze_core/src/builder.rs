//! Type-state builder for `ReadingSession` and generic `build_session` constructor.
//!
//! The builder enforces at compile time that a span locator is provided
//! before `build()` is available. `try_build()` is always available for dynamic checks.

use std::marker::PhantomData;

use gaze_traits::SpanLocator;

use crate::config::*;
use crate::error::{BuildError, Result};
use crate::session::{DynLocator, ReadingSession};

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `ReadingSession`. All fields are validated on `build()`.
pub struct ReadingSessionBuilder<Lc> {
    locator: Option<DynLocator>,
    cfg: SessionCfg,
    _l: PhantomData<Lc>,
}

impl Default for ReadingSessionBuilder<Missing> {
    fn default() -> Self {
        Self {
            locator: None,
            cfg: SessionCfg::default(),
            _l: PhantomData,
        }
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn non_negative(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

/// Reject configurations no clamp can repair.
///
/// The fixation radius is not checked here; the detector clamps it.
pub fn validate(cfg: &SessionCfg) -> Result<()> {
    let s = &cfg.smoothing;
    if !positive(s.min_cutoff) || !positive(s.d_cutoff) {
        return Err(invalid("smoothing cutoffs must be > 0"));
    }
    if !non_negative(s.beta) {
        return Err(invalid("smoothing beta must be >= 0"));
    }
    if !positive(s.base_freq_hz) {
        return Err(invalid("smoothing base frequency must be > 0"));
    }

    let o = &cfg.outlier;
    if o.window == 0 {
        return Err(invalid("outlier window must be >= 1"));
    }
    if o.warmup > o.window {
        return Err(invalid("outlier warmup must not exceed the window"));
    }
    if !positive(o.z_threshold) {
        return Err(invalid("outlier z threshold must be > 0"));
    }
    if !positive(o.min_std_px) {
        return Err(invalid("outlier std floor must be > 0"));
    }

    if !non_negative(cfg.fixation.min_duration_ms) {
        return Err(invalid("fixation min duration must be >= 0"));
    }
    if !positive(cfg.tracking.read_threshold_ms) {
        return Err(invalid("read threshold must be > 0"));
    }

    let d = &cfg.drift;
    if !positive(d.window_ms) || !positive(d.check_interval_ms) || !positive(d.no_data_ms) {
        return Err(invalid("drift window, interval and no-data timeout must be > 0"));
    }
    if !non_negative(d.margin_px) {
        return Err(invalid("drift margin must be >= 0"));
    }
    if !(d.off_screen_ratio > 0.0 && d.off_screen_ratio <= 1.0) {
        return Err(invalid("drift off-screen ratio must be in (0, 1]"));
    }
    if d.min_samples == 0 {
        return Err(invalid("drift min samples must be >= 1"));
    }

    if !positive(cfg.viewport.width) || !positive(cfg.viewport.height) {
        return Err(invalid("viewport must have a positive size"));
    }
    if let Some(err) = cfg.calibration_error_px
        && !non_negative(err)
    {
        return Err(invalid("calibration error must be >= 0"));
    }
    Ok(())
}

impl<Lc> ReadingSessionBuilder<Lc> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<ReadingSession> {
        let locator = self
            .locator
            .ok_or_else(|| eyre::Report::new(BuildError::MissingLocator))?;
        build_session(locator, self.cfg)
    }
}

/// Chainable setters that do not affect type-state.
impl<Lc> ReadingSessionBuilder<Lc> {
    /// Replace the whole configuration at once.
    pub fn with_config(mut self, cfg: SessionCfg) -> Self {
        self.cfg = cfg;
        self
    }
    pub fn with_smoothing(mut self, smoothing: SmoothingCfg) -> Self {
        self.cfg.smoothing = smoothing;
        self
    }
    pub fn with_outlier(mut self, outlier: OutlierCfg) -> Self {
        self.cfg.outlier = outlier;
        self
    }
    pub fn with_fixation(mut self, fixation: FixationCfg) -> Self {
        self.cfg.fixation = fixation;
        self
    }
    pub fn with_tracking(mut self, tracking: TrackingCfg) -> Self {
        self.cfg.tracking = tracking;
        self
    }
    pub fn with_drift(mut self, drift: DriftCfg) -> Self {
        self.cfg.drift = drift;
        self
    }
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.cfg.viewport = viewport;
        self
    }
    /// Average calibration error in pixels; sets the fixation radius.
    pub fn with_calibration_error(mut self, average_error_px: f64) -> Self {
        self.cfg.calibration_error_px = Some(average_error_px);
        self
    }
}

// Setter that advances type-state
impl ReadingSessionBuilder<Missing> {
    pub fn with_locator(
        self,
        locator: impl SpanLocator + Send + 'static,
    ) -> ReadingSessionBuilder<Set> {
        ReadingSessionBuilder {
            locator: Some(Box::new(locator)),
            cfg: self.cfg,
            _l: PhantomData,
        }
    }
}

impl ReadingSessionBuilder<Set> {
    /// Validate and build the session. Only available once a locator is set.
    pub fn build(self) -> Result<ReadingSession> {
        self.try_build()
    }
}

/// Build a statically-dispatched session around a concrete locator.
pub fn build_session<L: SpanLocator>(locator: L, cfg: SessionCfg) -> Result<ReadingSession<L>> {
    validate(&cfg)?;
    Ok(ReadingSession::from_parts(locator, cfg))
}

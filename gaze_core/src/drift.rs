//! Tracking-loss and drift watchdog over the raw sample stream.
//!
//! The monitor keeps raw samples from the trailing window and, on a fixed
//! cadence, decides whether tracking is lost (no recent samples), drifting
//! (too many samples off screen), or fine. It never touches pipeline state.

use std::collections::VecDeque;
use std::fmt;

use gaze_traits::GazeSample;

use crate::config::{DriftCfg, Viewport};

pub const LOST_MESSAGE: &str = "Face not detected. Please reposition in front of the camera.";
pub const DRIFT_MESSAGE: &str = "Eye tracking may have drifted. Consider re-calibrating.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriftStatus {
    #[default]
    Ok,
    Warning,
    Lost,
}

impl DriftStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DriftStatus::Ok => "ok",
            DriftStatus::Warning => "warning",
            DriftStatus::Lost => "lost",
        }
    }

    /// User-facing message; empty for `Ok`.
    pub fn message(self) -> &'static str {
        match self {
            DriftStatus::Ok => "",
            DriftStatus::Warning => DRIFT_MESSAGE,
            DriftStatus::Lost => LOST_MESSAGE,
        }
    }
}

impl fmt::Display for DriftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one drift check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftReport {
    pub status: DriftStatus,
    /// Time of the check (ms, same clock as sample timestamps).
    pub at_ms: f64,
    /// Off-screen fraction of the window; `None` for `Lost`.
    pub off_screen_ratio: Option<f64>,
}

impl DriftReport {
    pub fn message(&self) -> &'static str {
        self.status.message()
    }
}

#[derive(Debug, Clone)]
pub struct DriftMonitor {
    cfg: DriftCfg,
    viewport: Viewport,
    window: VecDeque<GazeSample>,
    last_sample_ms: f64,
    next_check_ms: Option<f64>,
}

impl DriftMonitor {
    pub fn new(cfg: DriftCfg, viewport: Viewport) -> Self {
        Self {
            cfg,
            viewport,
            window: VecDeque::new(),
            last_sample_ms: 0.0,
            next_check_ms: None,
        }
    }

    /// Arm the cadence. The start time counts as the last sample time.
    pub fn start(&mut self, now_ms: f64) {
        self.last_sample_ms = now_ms;
        self.next_check_ms = Some(now_ms + self.cfg.check_interval_ms);
    }

    /// Disarm the cadence and drop the window.
    pub fn stop(&mut self) {
        self.next_check_ms = None;
        self.window.clear();
    }

    pub fn is_armed(&self) -> bool {
        self.next_check_ms.is_some()
    }

    /// When the next check is due, if armed.
    pub fn next_check_ms(&self) -> Option<f64> {
        self.next_check_ms
    }

    /// Record a raw sample and prune the window relative to its timestamp.
    pub fn add_sample(&mut self, sample: &GazeSample) {
        self.last_sample_ms = sample.timestamp_ms;
        self.window.push_back(*sample);
        let cutoff = sample.timestamp_ms - self.cfg.window_ms;
        self.window.retain(|p| p.timestamp_ms > cutoff);
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Run the check if the cadence is due at `now_ms`.
    ///
    /// Missed intervals are skipped rather than replayed one by one.
    pub fn poll(&mut self, now_ms: f64) -> Option<DriftReport> {
        let due = self.next_check_ms?;
        if now_ms < due {
            return None;
        }
        let interval = self.cfg.check_interval_ms.max(1.0);
        let missed = ((now_ms - due) / interval).floor() + 1.0;
        self.next_check_ms = Some(missed.mul_add(interval, due));
        self.check(now_ms)
    }

    /// Evaluate the window at `now_ms`. `None` when there is too little data to judge.
    pub fn check(&self, now_ms: f64) -> Option<DriftReport> {
        if now_ms - self.last_sample_ms > self.cfg.no_data_ms {
            return Some(DriftReport {
                status: DriftStatus::Lost,
                at_ms: now_ms,
                off_screen_ratio: None,
            });
        }

        if self.window.len() < self.cfg.min_samples.max(1) {
            return None;
        }

        let margin = self.cfg.margin_px;
        let off = self
            .window
            .iter()
            .filter(|p| !self.viewport.contains_with_margin(p.x, p.y, margin))
            .count();
        let ratio = off as f64 / self.window.len() as f64;
        let status = if ratio > self.cfg.off_screen_ratio {
            DriftStatus::Warning
        } else {
            DriftStatus::Ok
        };
        Some(DriftReport {
            status,
            at_ms: now_ms,
            off_screen_ratio: Some(ratio),
        })
    }
}

impl Default for DriftMonitor {
    fn default() -> Self {
        Self::new(DriftCfg::default(), Viewport::default())
    }
}

//! Adaptive low-pass smoothing (One-Euro filter).
//!
//! Each axis runs an exponential smoother whose cutoff frequency rises with the
//! estimated signal speed: still gaze is smoothed hard, saccades pass with
//! little lag. `GazeFilter` pairs two independent axis filters.

use std::f64::consts::PI;

use crate::config::SmoothingCfg;
use crate::util::hz_from_interval_ms;

/// Smoothing factor of a first-order low-pass with the given cutoff at `freq_hz`.
#[inline]
pub fn alpha(cutoff_hz: f64, freq_hz: f64) -> f64 {
    let te = 1.0 / freq_hz;
    let tau = 1.0 / (2.0 * PI * cutoff_hz);
    1.0 / (1.0 + tau / te)
}

/// Exponential smoother; the first value passes through and seeds the state.
#[derive(Debug, Clone, Default)]
pub struct LowPass {
    last: Option<f64>,
}

impl LowPass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, value: f64, alpha: f64) -> f64 {
        let out = match self.last {
            Some(prev) => alpha.mul_add(value - prev, prev),
            None => value,
        };
        self.last = Some(out);
        out
    }

    pub fn last(&self) -> Option<f64> {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// One axis of the adaptive filter.
#[derive(Debug, Clone)]
pub struct OneEuroFilter {
    cfg: SmoothingCfg,
    freq_hz: f64,
    x: LowPass,
    dx: LowPass,
    last_time_ms: Option<f64>,
}

impl OneEuroFilter {
    pub fn new(cfg: SmoothingCfg) -> Self {
        let freq_hz = cfg.base_freq_hz;
        Self {
            cfg,
            freq_hz,
            x: LowPass::new(),
            dx: LowPass::new(),
            last_time_ms: None,
        }
    }

    /// Filter one axis value observed at `timestamp_ms`.
    pub fn apply(&mut self, value: f64, timestamp_ms: f64) -> f64 {
        // A repeated or out-of-order timestamp keeps the previous frequency.
        if let Some(last) = self.last_time_ms
            && let Some(hz) = hz_from_interval_ms(timestamp_ms - last)
        {
            self.freq_hz = hz;
        }
        self.last_time_ms = Some(timestamp_ms);

        let dx = match self.x.last() {
            Some(prev) => (value - prev) * self.freq_hz,
            None => 0.0,
        };
        let edx = self.dx.apply(dx, alpha(self.cfg.d_cutoff, self.freq_hz));
        let cutoff = self.cfg.beta.mul_add(edx.abs(), self.cfg.min_cutoff);
        self.x.apply(value, alpha(cutoff, self.freq_hz))
    }

    /// Current sampling frequency estimate.
    pub fn freq_hz(&self) -> f64 {
        self.freq_hz
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.dx.reset();
        self.last_time_ms = None;
        self.freq_hz = self.cfg.base_freq_hz;
    }
}

/// Two-axis gaze smoother.
#[derive(Debug, Clone)]
pub struct GazeFilter {
    x: OneEuroFilter,
    y: OneEuroFilter,
}

impl GazeFilter {
    pub fn new(cfg: SmoothingCfg) -> Self {
        Self {
            x: OneEuroFilter::new(cfg.clone()),
            y: OneEuroFilter::new(cfg),
        }
    }

    pub fn apply(&mut self, x: f64, y: f64, timestamp_ms: f64) -> (f64, f64) {
        (
            self.x.apply(x, timestamp_ms),
            self.y.apply(y, timestamp_ms),
        )
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
    }
}

impl Default for GazeFilter {
    fn default() -> Self {
        Self::new(SmoothingCfg::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_matches_closed_form() {
        // te = 1/30, tau = 1/(2*pi*1.5)
        let a = alpha(1.5, 30.0);
        let expected = 1.0 / (1.0 + (1.0 / (2.0 * PI * 1.5)) / (1.0 / 30.0));
        assert!((a - expected).abs() < 1e-12);
        assert!(a > 0.0 && a < 1.0);
    }

    #[test]
    fn low_pass_seeds_then_blends() {
        let mut lp = LowPass::new();
        assert_eq!(lp.apply(10.0, 0.5), 10.0);
        assert_eq!(lp.apply(20.0, 0.5), 15.0);
        lp.reset();
        assert_eq!(lp.last(), None);
        assert_eq!(lp.apply(4.0, 0.5), 4.0);
    }

    #[test]
    fn first_value_passes_through() {
        let mut f = OneEuroFilter::new(SmoothingCfg::default());
        assert_eq!(f.apply(123.0, 0.0), 123.0);
        assert_eq!(f.freq_hz(), 30.0);
    }

    #[test]
    fn second_value_uses_min_cutoff_blend() {
        let cfg = SmoothingCfg::default();
        let mut f = OneEuroFilter::new(cfg.clone());
        f.apply(100.0, 0.0);
        let out = f.apply(110.0, 50.0);

        // freq = 20 Hz; dx = 10 * 20 = 200; the derivative smoother was seeded with 0
        let edx = alpha(cfg.d_cutoff, 20.0) * 200.0;
        let cutoff = cfg.min_cutoff + cfg.beta * edx.abs();
        let a = alpha(cutoff, 20.0);
        let expected = a * 110.0 + (1.0 - a) * 100.0;
        assert!((out - expected).abs() < 1e-9, "{out} vs {expected}");
        assert_eq!(f.freq_hz(), 20.0);
    }

    #[test]
    fn duplicate_timestamp_keeps_frequency() {
        let mut f = OneEuroFilter::new(SmoothingCfg::default());
        f.apply(1.0, 0.0);
        f.apply(2.0, 25.0);
        assert_eq!(f.freq_hz(), 40.0);
        f.apply(3.0, 25.0);
        assert_eq!(f.freq_hz(), 40.0);
    }

    #[test]
    fn constant_input_is_fixed_point() {
        let mut f = GazeFilter::default();
        for i in 0..50 {
            let (x, y) = f.apply(300.0, 200.0, i as f64 * 33.0);
            assert!((x - 300.0).abs() < 1e-9);
            assert!((y - 200.0).abs() < 1e-9);
        }
    }

    #[test]
    fn jitter_is_attenuated() {
        let mut f = GazeFilter::default();
        let mut max_dev: f64 = 0.0;
        for i in 0..200 {
            let noise = if i % 2 == 0 { 8.0 } else { -8.0 };
            let (x, _) = f.apply(500.0 + noise, 500.0, i as f64 * 33.0);
            if i > 20 {
                max_dev = max_dev.max((x - 500.0).abs());
            }
        }
        assert!(max_dev < 8.0, "filtered deviation {max_dev} not below raw jitter");
    }

    #[test]
    fn step_is_followed() {
        let mut f = GazeFilter::default();
        for i in 0..30 {
            f.apply(100.0, 100.0, i as f64 * 33.0);
        }
        let mut last = 100.0;
        for i in 30..200 {
            let (x, _) = f.apply(700.0, 100.0, i as f64 * 33.0);
            assert!(x >= last - 1e-9 && x <= 700.0 + 1e-9);
            last = x;
        }
        assert!((last - 700.0).abs() < 1.0, "did not converge: {last}");
    }

    #[test]
    fn reset_forgets_history() {
        let mut f = GazeFilter::default();
        f.apply(10.0, 10.0, 0.0);
        f.apply(20.0, 20.0, 30.0);
        f.reset();
        assert_eq!(f.apply(900.0, 50.0, 60.0), (900.0, 50.0));
    }
}

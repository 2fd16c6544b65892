//! Z-score outlier rejection over a window of recently accepted samples.
//!
//! Rejected samples never enter the window, so a burst of bad readings cannot
//! drag the baseline towards itself and hide the readings that follow.

use std::collections::VecDeque;

use gaze_traits::GazeSample;

use crate::config::OutlierCfg;
use crate::util::mean_std;

/// Per-axis statistics of the accepted-sample window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub mean_x: f64,
    pub mean_y: f64,
    pub std_x: f64,
    pub std_y: f64,
}

#[derive(Debug, Clone)]
pub struct OutlierRejector {
    cfg: OutlierCfg,
    window: VecDeque<GazeSample>,
}

impl OutlierRejector {
    pub fn new(cfg: OutlierCfg) -> Self {
        let cap = cfg.window.max(1);
        Self {
            window: VecDeque::with_capacity(cap),
            cfg,
        }
    }

    /// Screen a candidate. Returns `true` if it was accepted (and added to the window).
    pub fn accept(&mut self, sample: &GazeSample) -> bool {
        if self.window.len() >= self.cfg.warmup
            && let Some(stats) = self.stats()
        {
            let std_x = stats.std_x.max(self.cfg.min_std_px);
            let std_y = stats.std_y.max(self.cfg.min_std_px);
            let zx = (sample.x - stats.mean_x).abs() / std_x;
            let zy = (sample.y - stats.mean_y).abs() / std_y;
            if zx > self.cfg.z_threshold || zy > self.cfg.z_threshold {
                tracing::debug!(x = sample.x, y = sample.y, zx, zy, "gaze sample rejected");
                return false;
            }
        }

        self.window.push_back(*sample);
        while self.window.len() > self.cfg.window.max(1) {
            self.window.pop_front();
        }
        true
    }

    /// Mean and (unfloored) population standard deviation of the window.
    pub fn stats(&self) -> Option<WindowStats> {
        if self.window.is_empty() {
            return None;
        }
        let (mean_x, std_x) = mean_std(self.window.iter().map(|p| p.x));
        let (mean_y, std_y) = mean_std(self.window.iter().map(|p| p.y));
        Some(WindowStats {
            mean_x,
            mean_y,
            std_x,
            std_y,
        })
    }

    /// Number of samples currently in the window.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}

impl Default for OutlierRejector {
    fn default() -> Self {
        Self::new(OutlierCfg::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(x: f64, y: f64, t: f64) -> GazeSample {
        GazeSample::new(x, y, t)
    }

    #[test]
    fn warmup_accepts_anything() {
        let mut r = OutlierRejector::default();
        for (i, x) in [0.0, 5000.0, -300.0, 12.0, 9999.0].into_iter().enumerate() {
            assert!(r.accept(&s(x, x, i as f64)));
        }
        assert_eq!(r.len(), 5);
    }

    #[test]
    fn far_sample_rejected_and_window_unchanged() {
        let mut r = OutlierRejector::default();
        let warm = [
            (100.0, 100.0),
            (102.0, 98.0),
            (98.0, 102.0),
            (101.0, 99.0),
            (99.0, 101.0),
        ];
        for (i, (x, y)) in warm.into_iter().enumerate() {
            assert!(r.accept(&s(x, y, i as f64 * 30.0)));
        }
        let before = r.stats().unwrap();
        assert!(!r.accept(&s(500.0, 500.0, 200.0)));
        assert_eq!(r.stats().unwrap(), before);
        assert_eq!(r.len(), 5);
    }

    #[test]
    fn std_floor_allows_small_moves_after_static_window() {
        let mut r = OutlierRejector::default();
        for i in 0..5 {
            r.accept(&s(200.0, 200.0, i as f64));
        }
        // std = 0 is floored at 10, so 29 px away gives z = 2.9 < 3.
        assert!(r.accept(&s(229.0, 200.0, 10.0)));
    }

    #[test]
    fn static_window_rejects_beyond_three_floors() {
        let mut r = OutlierRejector::default();
        for i in 0..5 {
            r.accept(&s(200.0, 200.0, i as f64));
        }
        assert!(!r.accept(&s(200.0, 231.0, 10.0)));
    }

    #[test]
    fn window_evicts_oldest() {
        let cfg = OutlierCfg {
            window: 6,
            ..OutlierCfg::default()
        };
        let mut r = OutlierRejector::new(cfg);
        for i in 0..10 {
            r.accept(&s(100.0 + i as f64, 100.0, i as f64));
        }
        assert_eq!(r.len(), 6);
        let st = r.stats().unwrap();
        // remaining x values are 104..=109
        assert!((st.mean_x - 106.5).abs() < 1e-12);
    }

    #[test]
    fn reset_restarts_warmup() {
        let mut r = OutlierRejector::default();
        for i in 0..5 {
            r.accept(&s(0.0, 0.0, i as f64));
        }
        r.reset();
        assert!(r.is_empty());
        assert!(r.accept(&s(10_000.0, 10_000.0, 10.0)));
    }
}

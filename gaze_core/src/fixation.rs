//! Incremental dispersion clustering of smoothed gaze into fixations.
//!
//! A candidate joins the current cluster when it lies within `radius` of the
//! centroid of the samples already in the cluster; the candidate itself is
//! not part of that centroid. Any farther sample closes the cluster and starts
//! a new one. Closed clusters shorter than `min_duration_ms` (or with a single
//! sample) are discarded; the rest become `Fixation`s resolved to a span.

use gaze_traits::{GazeSample, SpanId, SpanLocator};

use crate::config::FixationCfg;

/// Bounds for a radius set directly.
pub const MIN_RADIUS_PX: f64 = 20.0;
pub const MAX_RADIUS_PX: f64 = 200.0;
/// Radius used when no calibration error estimate is available.
pub const DEFAULT_RADIUS_PX: f64 = 50.0;
/// Fraction of the calibration error used as radius, and the range it is clamped into.
pub const RADIUS_PER_ERROR: f64 = 0.65;
pub const CALIBRATED_MIN_RADIUS_PX: f64 = 30.0;
pub const CALIBRATED_MAX_RADIUS_PX: f64 = 150.0;

/// Cluster radius for a calibration with the given average error (px).
pub fn radius_from_calibration_error(average_error_px: Option<f64>) -> f64 {
    match average_error_px {
        Some(err) if err.is_finite() => (err * RADIUS_PER_ERROR)
            .clamp(CALIBRATED_MIN_RADIUS_PX, CALIBRATED_MAX_RADIUS_PX),
        _ => DEFAULT_RADIUS_PX,
    }
}

/// A period where gaze stayed within the cluster radius.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixation {
    pub x: f64,
    pub y: f64,
    pub start_time_ms: f64,
    pub duration_ms: f64,
    /// Span under the centroid; `None` over margins, images, or chrome.
    pub target: Option<SpanId>,
}

impl Fixation {
    #[inline]
    pub fn end_time_ms(&self) -> f64 {
        self.start_time_ms + self.duration_ms
    }
}

#[derive(Debug, Clone)]
pub struct FixationDetector {
    radius_px: f64,
    min_duration_ms: f64,
    cluster: Vec<GazeSample>,
    sum_x: f64,
    sum_y: f64,
}

impl FixationDetector {
    pub fn new(cfg: &FixationCfg) -> Self {
        Self {
            radius_px: clamp_radius(cfg.radius_px),
            min_duration_ms: cfg.min_duration_ms.max(0.0),
            cluster: Vec::new(),
            sum_x: 0.0,
            sum_y: 0.0,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius_px
    }

    /// Change the radius, clamped to `[MIN_RADIUS_PX, MAX_RADIUS_PX]`.
    ///
    /// The cluster in progress is kept and judged against the new radius from
    /// the next sample on.
    pub fn set_radius(&mut self, radius_px: f64) {
        self.radius_px = clamp_radius(radius_px);
    }

    pub fn min_duration_ms(&self) -> f64 {
        self.min_duration_ms
    }

    /// Number of samples in the cluster in progress.
    pub fn pending_len(&self) -> usize {
        self.cluster.len()
    }

    /// Feed one smoothed sample. Returns a fixation when this sample closed a
    /// cluster that qualified.
    pub fn add_sample<L>(&mut self, sample: GazeSample, locator: &L) -> Option<Fixation>
    where
        L: SpanLocator + ?Sized,
    {
        let Some((cx, cy)) = self.centroid() else {
            self.start_cluster(sample);
            return None;
        };

        let dist = (sample.x - cx).hypot(sample.y - cy);
        if dist <= self.radius_px {
            self.push(sample);
            return None;
        }

        let fixation = self.finalize(locator);
        self.start_cluster(sample);
        fixation
    }

    /// Close whatever cluster is in progress and clear state.
    pub fn flush<L>(&mut self, locator: &L) -> Option<Fixation>
    where
        L: SpanLocator + ?Sized,
    {
        let fixation = self.finalize(locator);
        self.clear();
        fixation
    }

    /// Drop the cluster in progress without emitting anything.
    pub fn reset(&mut self) {
        self.clear();
    }

    fn centroid(&self) -> Option<(f64, f64)> {
        if self.cluster.is_empty() {
            return None;
        }
        let n = self.cluster.len() as f64;
        Some((self.sum_x / n, self.sum_y / n))
    }

    fn push(&mut self, sample: GazeSample) {
        self.sum_x += sample.x;
        self.sum_y += sample.y;
        self.cluster.push(sample);
    }

    fn start_cluster(&mut self, sample: GazeSample) {
        self.clear();
        self.push(sample);
    }

    fn clear(&mut self) {
        self.cluster.clear();
        self.sum_x = 0.0;
        self.sum_y = 0.0;
    }

    fn finalize<L>(&self, locator: &L) -> Option<Fixation>
    where
        L: SpanLocator + ?Sized,
    {
        let (first, last) = match self.cluster.as_slice() {
            [first, .., last] => (first, last),
            _ => return None,
        };
        let duration_ms = last.timestamp_ms - first.timestamp_ms;
        if duration_ms < self.min_duration_ms {
            return None;
        }
        let (x, y) = self.centroid()?;
        let target = locator.hit_test(x, y);
        tracing::debug!(
            x,
            y,
            duration_ms,
            samples = self.cluster.len(),
            span_id = target.as_ref().map(SpanId::as_str),
            "fixation"
        );
        Some(Fixation {
            x,
            y,
            start_time_ms: first.timestamp_ms,
            duration_ms,
            target,
        })
    }
}

impl Default for FixationDetector {
    fn default() -> Self {
        Self::new(&FixationCfg::default())
    }
}

#[inline]
fn clamp_radius(r: f64) -> f64 {
    if r.is_nan() {
        return DEFAULT_RADIUS_PX;
    }
    r.clamp(MIN_RADIUS_PX, MAX_RADIUS_PX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{FixedLocator, NullLocator};

    fn s(x: f64, y: f64, t: f64) -> GazeSample {
        GazeSample::new(x, y, t)
    }

    #[test]
    fn emits_on_cluster_break() {
        let mut d = FixationDetector::default();
        let loc = FixedLocator::new("s1", 10);
        for p in [
            s(100.0, 100.0, 0.0),
            s(102.0, 101.0, 50.0),
            s(98.0, 99.0, 100.0),
            s(101.0, 100.0, 150.0),
        ] {
            assert!(d.add_sample(p, &loc).is_none());
        }
        let f = d.add_sample(s(400.0, 400.0, 200.0), &loc).expect("fixation");
        assert!((f.x - 100.25).abs() < 1e-9);
        assert!((f.y - 100.0).abs() < 1e-9);
        assert_eq!(f.start_time_ms, 0.0);
        assert_eq!(f.duration_ms, 150.0);
        assert_eq!(f.target, Some(SpanId::new("s1")));
        assert_eq!(d.pending_len(), 1);
    }

    #[test]
    fn short_cluster_discarded() {
        let mut d = FixationDetector::default();
        d.add_sample(s(0.0, 0.0, 0.0), &NullLocator);
        d.add_sample(s(1.0, 1.0, 60.0), &NullLocator);
        assert!(d.add_sample(s(500.0, 0.0, 90.0), &NullLocator).is_none());
    }

    #[test]
    fn single_sample_cluster_discarded() {
        let mut d = FixationDetector::default();
        d.add_sample(s(0.0, 0.0, 0.0), &NullLocator);
        assert!(d.add_sample(s(500.0, 0.0, 1000.0), &NullLocator).is_none());
    }

    #[test]
    fn miss_still_emits_with_no_target() {
        let mut d = FixationDetector::default();
        d.add_sample(s(0.0, 0.0, 0.0), &NullLocator);
        d.add_sample(s(0.0, 0.0, 120.0), &NullLocator);
        let f = d.flush(&NullLocator).expect("fixation");
        assert_eq!(f.target, None);
        assert_eq!(f.duration_ms, 120.0);
    }

    #[test]
    fn distance_uses_prior_centroid_only() {
        // Prior centroid (0,0); candidate at exactly the radius joins.
        let mut d = FixationDetector::default();
        d.add_sample(s(0.0, 0.0, 0.0), &NullLocator);
        assert!(d.add_sample(s(50.0, 0.0, 10.0), &NullLocator).is_none());
        assert_eq!(d.pending_len(), 2);
        // Prior centroid is now (25,0): 76 px is beyond 50 even though it would
        // fall within 50 of a centroid recomputed with the candidate included.
        d.add_sample(s(76.0, 0.0, 20.0), &NullLocator);
        assert_eq!(d.pending_len(), 1);
    }

    #[test]
    fn flush_clears_state() {
        let mut d = FixationDetector::default();
        d.add_sample(s(0.0, 0.0, 0.0), &NullLocator);
        d.add_sample(s(0.0, 0.0, 200.0), &NullLocator);
        assert!(d.flush(&NullLocator).is_some());
        assert_eq!(d.pending_len(), 0);
        assert!(d.flush(&NullLocator).is_none());
    }

    #[test]
    fn set_radius_clamps_and_keeps_cluster() {
        let mut d = FixationDetector::default();
        d.add_sample(s(0.0, 0.0, 0.0), &NullLocator);
        d.set_radius(5.0);
        assert_eq!(d.radius(), MIN_RADIUS_PX);
        d.set_radius(1000.0);
        assert_eq!(d.radius(), MAX_RADIUS_PX);
        assert_eq!(d.pending_len(), 1);
    }

    #[test]
    fn calibration_radius_mapping() {
        assert_eq!(radius_from_calibration_error(None), 50.0);
        assert_eq!(radius_from_calibration_error(Some(10.0)), 30.0);
        assert!((radius_from_calibration_error(Some(100.0)) - 65.0).abs() < 1e-9);
        assert_eq!(radius_from_calibration_error(Some(400.0)), 150.0);
        assert_eq!(radius_from_calibration_error(Some(f64::NAN)), 50.0);
    }
}

//! `ReadingSession`: one document, one gaze stream, all accumulated state.
//!
//! Each raw sample runs through the whole pipeline before the next one:
//! malformed guard, drift tap, outlier rejection, smoothing, fixation
//! clustering, and read tracking. Time is always passed in explicitly so the
//! same session can be driven live or from a recorded trace.

use gaze_traits::{GazeSample, SpanId, SpanLocator};

use crate::builder::{Missing, ReadingSessionBuilder};
use crate::config::{FixationCfg, SessionCfg};
use crate::drift::{DriftMonitor, DriftReport, DriftStatus};
use crate::fixation::{Fixation, FixationDetector, radius_from_calibration_error};
use crate::listener::ListenerHandle;
use crate::outlier::OutlierRejector;
use crate::smoothing::GazeFilter;
use crate::status::SampleOutcome;
use crate::tracker::{ReadMap, ReadStatus, ReadTracker};
use crate::verification::{VerificationInput, VerificationResult, compute_verification, pages_read};

/// Boxed locator used by the builder.
pub type DynLocator = Box<dyn SpanLocator + Send>;

/// Counters over the session lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub samples: u64,
    pub malformed: u64,
    pub rejected: u64,
    pub accepted: u64,
    pub fixations: u64,
    /// Fixations that landed outside every span.
    pub untargeted_fixations: u64,
    pub drift_warnings: u64,
    pub lost_reports: u64,
}

/// Live reading progress for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub read_spans: usize,
    pub total_spans: usize,
    pub coverage_percent: f64,
}

pub struct ReadingSession<L: SpanLocator = DynLocator> {
    locator: L,
    rejector: OutlierRejector,
    filter: GazeFilter,
    detector: FixationDetector,
    tracker: ReadTracker,
    drift: DriftMonitor,
    fixation_cfg: FixationCfg,
    calibration_error_px: Option<f64>,
    drift_status: DriftStatus,
    last_fixation: Option<Fixation>,
    started_at_ms: Option<f64>,
    stopped_at_ms: Option<f64>,
    active: bool,
    listener: Option<ListenerHandle>,
    stats: SessionStats,
}

impl<L: SpanLocator> core::fmt::Debug for ReadingSession<L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ReadingSession")
            .field("active", &self.active)
            .field("radius_px", &self.detector.radius())
            .field("drift_status", &self.drift_status)
            .field("regions", &self.tracker.read_map().len())
            .field("stats", &self.stats)
            .finish()
    }
}

impl ReadingSession {
    /// Start building a session around a boxed locator.
    pub fn builder() -> ReadingSessionBuilder<Missing> {
        ReadingSessionBuilder::default()
    }
}

impl<L: SpanLocator> ReadingSession<L> {
    /// Assemble a session from an already validated configuration.
    pub(crate) fn from_parts(locator: L, cfg: SessionCfg) -> Self {
        let calibration_error_px = sanitize_error(cfg.calibration_error_px);
        let mut detector = FixationDetector::new(&cfg.fixation);
        if calibration_error_px.is_some() {
            detector.set_radius(radius_from_calibration_error(calibration_error_px));
        }
        Self {
            locator,
            rejector: OutlierRejector::new(cfg.outlier),
            filter: GazeFilter::new(cfg.smoothing),
            detector,
            tracker: ReadTracker::new(&cfg.tracking),
            drift: DriftMonitor::new(cfg.drift, cfg.viewport),
            fixation_cfg: cfg.fixation,
            calibration_error_px,
            drift_status: DriftStatus::Ok,
            last_fixation: None,
            started_at_ms: None,
            stopped_at_ms: None,
            active: false,
            listener: None,
            stats: SessionStats::default(),
        }
    }

    /// Begin (or restart) a reading session at `now_ms`.
    ///
    /// Restarting discards everything accumulated by the previous run.
    pub fn start(&mut self, now_ms: f64) {
        if self.active {
            tracing::debug!("session already running; start ignored");
            return;
        }
        self.rejector.reset();
        self.filter.reset();
        self.detector.reset();
        self.tracker.reset();
        self.drift.start(now_ms);
        self.drift_status = DriftStatus::Ok;
        self.last_fixation = None;
        self.started_at_ms = Some(now_ms);
        self.stopped_at_ms = None;
        self.stats = SessionStats::default();
        self.active = true;
        tracing::info!(
            at_ms = now_ms,
            spans = self.locator.total_span_count(),
            radius_px = self.detector.radius(),
            "reading session started"
        );
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Run one raw sample through the pipeline.
    pub fn push_sample(&mut self, sample: GazeSample) -> SampleOutcome {
        if !self.active {
            return SampleOutcome::Inactive;
        }
        self.stats.samples += 1;
        if !sample.is_finite() {
            self.stats.malformed += 1;
            return SampleOutcome::Malformed;
        }

        self.drift.add_sample(&sample);

        if !self.rejector.accept(&sample) {
            self.stats.rejected += 1;
            return SampleOutcome::Rejected;
        }
        self.stats.accepted += 1;

        let (x, y) = self.filter.apply(sample.x, sample.y, sample.timestamp_ms);
        let smoothed = GazeSample::new(x, y, sample.timestamp_ms);
        let fixation = self.detector.add_sample(smoothed, &self.locator);
        if let Some(f) = &fixation {
            self.record(f);
        }
        SampleOutcome::Accepted { fixation }
    }

    /// Drive the drift cadence. Returns a report when a check ran and had enough data.
    pub fn tick(&mut self, now_ms: f64) -> Option<DriftReport> {
        if !self.active {
            return None;
        }
        let report = self.drift.poll(now_ms)?;
        if report.status != self.drift_status {
            match report.status {
                DriftStatus::Ok => {
                    tracing::info!(at_ms = now_ms, from = %self.drift_status, "tracking recovered");
                }
                DriftStatus::Warning => tracing::warn!(
                    at_ms = now_ms,
                    off_screen_ratio = report.off_screen_ratio,
                    "{}",
                    report.message()
                ),
                DriftStatus::Lost => {
                    tracing::warn!(at_ms = now_ms, "{}", report.message());
                }
            }
        }
        match report.status {
            DriftStatus::Warning => self.stats.drift_warnings += 1,
            DriftStatus::Lost => self.stats.lost_reports += 1,
            DriftStatus::Ok => {}
        }
        self.drift_status = report.status;
        Some(report)
    }

    /// Stop the session: flush the cluster in progress, cancel the attached
    /// listener and disarm the drift cadence.
    ///
    /// Returns the fixation produced by the flush, if any. Idempotent.
    pub fn stop(&mut self, now_ms: f64) -> Option<Fixation> {
        if let Some(handle) = self.listener.take() {
            handle.cancel();
        }
        if !self.active {
            return None;
        }
        let flushed = self.detector.flush(&self.locator);
        if let Some(f) = &flushed {
            self.record(f);
        }
        self.drift.stop();
        self.active = false;
        self.stopped_at_ms = Some(now_ms);
        tracing::info!(
            at_ms = now_ms,
            fixations = self.stats.fixations,
            read = self.tracker.read_count(),
            "reading session stopped"
        );
        flushed
    }

    /// Tie a dispatcher subscription to this session; `stop` cancels it.
    pub fn attach_listener(&mut self, handle: ListenerHandle) {
        if let Some(prev) = self.listener.replace(handle) {
            prev.cancel();
        }
    }

    /// Apply a new calibration error estimate (px).
    ///
    /// The cluster radius is re-derived and the smoother restarts, since
    /// coordinates from before and after a calibration are not comparable.
    pub fn set_calibration_error(&mut self, average_error_px: Option<f64>) {
        self.calibration_error_px = sanitize_error(average_error_px);
        let radius = match self.calibration_error_px {
            Some(_) => radius_from_calibration_error(self.calibration_error_px),
            None => self.fixation_cfg.radius_px,
        };
        self.detector.set_radius(radius);
        self.filter.reset();
        tracing::debug!(
            error_px = self.calibration_error_px,
            radius_px = self.detector.radius(),
            "calibration updated"
        );
    }

    /// Forget the calibration: default radius, fresh smoother and outlier
    /// window, and the cluster in progress is discarded.
    pub fn invalidate_calibration(&mut self) {
        self.calibration_error_px = None;
        self.detector.reset();
        self.detector.set_radius(self.fixation_cfg.radius_px);
        self.filter.reset();
        self.rejector.reset();
        tracing::info!("calibration invalidated");
    }

    pub fn calibration_error_px(&self) -> Option<f64> {
        self.calibration_error_px
    }

    pub fn fixation_radius_px(&self) -> f64 {
        self.detector.radius()
    }

    /// When the drift cadence next fires, while the session runs.
    pub fn next_drift_check_ms(&self) -> Option<f64> {
        if self.active { self.drift.next_check_ms() } else { None }
    }

    pub fn drift_status(&self) -> DriftStatus {
        self.drift_status
    }

    pub fn last_fixation(&self) -> Option<&Fixation> {
        self.last_fixation.as_ref()
    }

    pub fn read_map(&self) -> &ReadMap {
        self.tracker.read_map()
    }

    pub fn region_status(&self, id: &SpanId) -> ReadStatus {
        self.tracker.status(id)
    }

    pub fn coverage_percent(&self) -> f64 {
        self.tracker
            .coverage_percent(self.locator.total_span_count())
    }

    pub fn progress(&self) -> Progress {
        let total_spans = self.locator.total_span_count();
        let read_spans = self.tracker.read_count();
        Progress {
            read_spans,
            total_spans,
            coverage_percent: self.tracker.coverage_percent(total_spans),
        }
    }

    /// When the current or last run started, if the session was ever started.
    pub fn started_at_ms(&self) -> Option<f64> {
        self.started_at_ms
    }

    /// Elapsed session time at `now_ms`; frozen once stopped.
    pub fn read_time_ms(&self, now_ms: f64) -> f64 {
        match self.started_at_ms {
            Some(start) => (self.stopped_at_ms.unwrap_or(now_ms) - start).max(0.0),
            None => 0.0,
        }
    }

    /// Score the session as it stands at `now_ms`.
    pub fn verify(&self, now_ms: f64) -> VerificationResult {
        let read_map = self.tracker.read_map();
        compute_verification(&VerificationInput {
            read_map,
            total_spans: self.locator.total_span_count(),
            total_read_time_ms: self.read_time_ms(now_ms),
            pages_read: pages_read(read_map),
            total_pages: self.locator.total_page_count(),
            timestamp_ms: now_ms,
        })
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }

    fn record(&mut self, fixation: &Fixation) {
        self.stats.fixations += 1;
        if fixation.target.is_none() {
            self.stats.untargeted_fixations += 1;
        }
        self.tracker.record_fixation(fixation);
        self.last_fixation = Some(fixation.clone());
    }
}

fn sanitize_error(err: Option<f64>) -> Option<f64> {
    err.filter(|e| e.is_finite() && *e >= 0.0)
}

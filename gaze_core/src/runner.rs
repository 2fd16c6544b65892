//! Session drivers: replay a recorded trace, or stream from a live feed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel as xch;
use gaze_traits::clock::Clock;
use gaze_traits::{GazeSample, SpanLocator};

use crate::drift::DriftReport;
use crate::feed::{FeedEvent, GazeFeed};
use crate::fixation::Fixation;
use crate::session::{ReadingSession, SessionStats};
use crate::status::SampleOutcome;
use crate::verification::VerificationResult;

/// Default cadence, in milliseconds, at which the live loop wakes up to drive drift checks.
pub const DEFAULT_TICK_MS: u64 = 250;

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Session time the run started at; report times are relative to it.
    pub started_at_ms: f64,
    pub stats: SessionStats,
    pub fixations: Vec<Fixation>,
    pub drift_reports: Vec<DriftReport>,
    pub result: VerificationResult,
}

#[derive(Default)]
struct Collector {
    fixations: Vec<Fixation>,
    drift_reports: Vec<DriftReport>,
}

impl Collector {
    fn outcome(&mut self, outcome: SampleOutcome) {
        if let SampleOutcome::Accepted {
            fixation: Some(f),
        } = outcome
        {
            self.fixations.push(f);
        }
    }

    fn finish<L: SpanLocator>(mut self, session: &mut ReadingSession<L>, end_ms: f64) -> RunSummary {
        if let Some(f) = session.stop(end_ms) {
            self.fixations.push(f);
        }
        RunSummary {
            started_at_ms: session.started_at_ms().unwrap_or(end_ms),
            stats: session.stats(),
            fixations: self.fixations,
            drift_reports: self.drift_reports,
            result: session.verify(end_ms),
        }
    }
}

/// Drive a session from a recorded trace using the samples' own timestamps as time.
///
/// Drift checks fire at their scheduled times between samples, so gaps in the
/// trace surface as `Lost` exactly as they would live. The session is started
/// at the first timestamp if it is not already running, and stopped at the last.
pub fn replay<L: SpanLocator>(
    session: &mut ReadingSession<L>,
    samples: &[GazeSample],
) -> RunSummary {
    let mut out = Collector::default();
    let start_ms = samples
        .iter()
        .map(|s| s.timestamp_ms)
        .find(|t| t.is_finite())
        .unwrap_or(0.0);
    if !session.is_active() {
        session.start(start_ms);
    }
    tracing::info!(samples = samples.len(), mode = "replay", "run start");

    let mut now_ms = start_ms;
    for s in samples {
        if s.timestamp_ms.is_finite() {
            now_ms = now_ms.max(s.timestamp_ms);
            drive_drift(session, now_ms, &mut out.drift_reports);
        }
        out.outcome(session.push_sample(*s));
    }
    drive_drift(session, now_ms, &mut out.drift_reports);

    let summary = out.finish(session, now_ms);
    tracing::info!(
        fixations = summary.fixations.len(),
        coverage = summary.result.coverage_percent,
        verdict = summary.result.verdict.as_str(),
        "run complete"
    );
    summary
}

/// Fire every drift check scheduled at or before `now_ms`, at its own due time.
fn drive_drift<L: SpanLocator>(
    session: &mut ReadingSession<L>,
    now_ms: f64,
    reports: &mut Vec<DriftReport>,
) {
    while let Some(due) = session.next_drift_check_ms()
        && due <= now_ms
    {
        if let Some(r) = session.tick(due) {
            reports.push(r);
        }
    }
}

/// Drive a session from a live feed until the source ends or `shutdown` is set.
///
/// Samples are stamped on arrival with session time (`clock` milliseconds
/// since the loop started); source timestamps are ignored so drift checks and
/// samples share one time base.
pub fn stream<L, C>(
    session: &mut ReadingSession<L>,
    feed: &GazeFeed,
    clock: &C,
    tick: Duration,
    shutdown: &AtomicBool,
) -> RunSummary
where
    L: SpanLocator,
    C: Clock,
{
    let epoch = clock.now();
    let mut out = Collector::default();
    if !session.is_active() {
        session.start(0.0);
    }
    tracing::info!(mode = "stream", "run start");

    let ticker = xch::tick(tick);
    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!("shutdown requested");
            break;
        }
        xch::select! {
            recv(feed.receiver()) -> msg => match msg {
                Ok(FeedEvent::Sample(s)) => {
                    let now = clock.ms_since(epoch);
                    let stamped = GazeSample::new(s.x, s.y, now);
                    out.outcome(session.push_sample(stamped));
                }
                Ok(FeedEvent::Ended) => break,
                Err(_) => {
                    tracing::debug!("gaze feed disconnected");
                    break;
                }
            },
            recv(ticker) -> _ => {
                let now = clock.ms_since(epoch);
                if let Some(r) = session.tick(now) {
                    out.drift_reports.push(r);
                }
            }
        }
    }

    let end_ms = clock.ms_since(epoch);
    let summary = out.finish(session, end_ms);
    tracing::info!(
        fixations = summary.fixations.len(),
        coverage = summary.result.coverage_percent,
        verdict = summary.result.verdict.as_str(),
        "run complete"
    );
    summary
}

//! Subcommand bodies: config mapping, session assembly, and output.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use gaze_core::calibration::{CalibrationReport, ValidationPoint};
use gaze_core::conversions::samples_from_rows;
use gaze_core::error::GazeError;
use gaze_core::feed::GazeFeed;
use gaze_core::mocks::NullLocator;
use gaze_core::runner::{self, RunSummary};
use gaze_core::{RectLayout, SessionCfg, SpanLocator, build_session};
use gaze_traits::clock::MonotonicClock;

use crate::report;
use crate::source::LineSource;

/// How long the feed thread waits on the line reader per attempt.
const STDIN_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Runtime session config from the file, with a CLI calibration override.
pub fn session_cfg(cfg: &gaze_config::Config, calibration_error: Option<f64>) -> SessionCfg {
    let mut session: SessionCfg = cfg.into();
    if let Some(err) = calibration_error {
        session.calibration_error_px = Some(err);
    }
    session
}

/// Tag a loader failure as bad input.
fn bad_input(e: eyre::Report) -> eyre::Report {
    GazeError::Input(e.to_string()).into()
}

fn load_layout(path: &Path) -> eyre::Result<RectLayout> {
    let rows = gaze_config::load_layout_csv(path).map_err(bad_input)?;
    let layout = RectLayout::from(rows.as_slice());
    tracing::info!(
        spans = layout.total_span_count(),
        pages = layout.total_page_count(),
        "layout loaded"
    );
    Ok(layout)
}

fn print_summary(sum: &RunSummary, total_spans: usize, fixations: bool, json: bool) {
    if json {
        println!("{}", report::summary_json(sum, total_spans, fixations));
    } else {
        print!("{}", report::render_summary(sum, total_spans, fixations));
    }
}

pub fn run_replay(
    cfg: &gaze_config::Config,
    samples: &Path,
    layout: &Path,
    calibration_error: Option<f64>,
    fixations: bool,
    json: bool,
) -> eyre::Result<()> {
    let layout = load_layout(layout)?;
    let rows = gaze_config::load_trace_csv(samples).map_err(bad_input)?;
    let trace = samples_from_rows(&rows);
    let total_spans = layout.total_span_count();

    let mut session = build_session(layout, session_cfg(cfg, calibration_error))?;
    tracing::info!(
        samples = trace.len(),
        radius_px = session.fixation_radius_px(),
        "replay start"
    );
    let sum = runner::replay(&mut session, &trace);
    print_summary(&sum, total_spans, fixations, json);
    Ok(())
}

pub fn run_stream(
    cfg: &gaze_config::Config,
    layout: &Path,
    calibration_error: Option<f64>,
    tick_ms: u64,
    json: bool,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<()> {
    if tick_ms == 0 {
        eyre::bail!("--tick-ms must be > 0");
    }
    let layout = load_layout(layout)?;
    let total_spans = layout.total_span_count();
    let mut session = build_session(layout, session_cfg(cfg, calibration_error))?;

    let clock = MonotonicClock::new();
    let feed = GazeFeed::spawn(LineSource::spawn(std::io::stdin()), STDIN_READ_TIMEOUT);
    let sum = runner::stream(
        &mut session,
        &feed,
        &clock,
        Duration::from_millis(tick_ms),
        &shutdown,
    );
    print_summary(&sum, total_spans, false, json);
    Ok(())
}

pub fn run_calibrate(validation: &Path, json: bool) -> eyre::Result<()> {
    let rows = gaze_config::load_validation_csv(validation).map_err(bad_input)?;
    let points: Vec<ValidationPoint> = rows.iter().map(ValidationPoint::from).collect();
    let report = CalibrationReport::from_points(&points)
        .ok_or_else(|| GazeError::Input("validation CSV has no finite samples".into()))?;
    tracing::info!(
        average_error_px = report.average_error_px,
        quality = report.quality.as_str(),
        "calibration judged"
    );
    if json {
        println!("{}", report::calibration_json(&report));
    } else {
        print!("{}", report::render_calibration(&report));
    }
    Ok(())
}

pub fn run_self_check(cfg: &gaze_config::Config, json: bool) -> eyre::Result<()> {
    let session = build_session(NullLocator, session_cfg(cfg, None))?;
    if json {
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "fixation_radius_px": session.fixation_radius_px(),
            })
        );
    } else {
        println!("OK (fixation radius {:.0}px)", session.fixation_radius_px());
    }
    Ok(())
}

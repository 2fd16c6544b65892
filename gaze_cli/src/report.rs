//! Text and JSON rendering of run summaries and calibration reports.

use gaze_core::calibration::CalibrationReport;
use gaze_core::drift::DriftStatus;
use gaze_core::runner::RunSummary;
use serde_json::{Value, json};

/// Whole seconds as `Xm Ys`; negative and non-finite input reads as zero.
pub fn format_read_time(ms: f64) -> String {
    let secs = whole_seconds(ms);
    format!("{}m {}s", secs / 60, secs % 60)
}

/// Whole seconds as `m:ss`, for progress lines.
pub fn format_clock(ms: f64) -> String {
    let secs = whole_seconds(ms);
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_seconds(ms: f64) -> u64 {
    if ms.is_finite() && ms > 0.0 {
        (ms / 1000.0).floor() as u64
    } else {
        0
    }
}

fn unix_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

pub fn render_summary(sum: &RunSummary, total_spans: usize, with_fixations: bool) -> String {
    let r = &sum.result;
    let warnings = sum
        .drift_reports
        .iter()
        .filter(|d| d.status != DriftStatus::Ok)
        .count();
    let mut out = String::new();
    out.push_str(&format!("Verdict:          {}\n", r.verdict));
    out.push_str(&format!("Coverage:         {:.1}%\n", r.coverage_percent));
    out.push_str(&format!(
        "Spans read:       {} / {total_spans}\n",
        r.read_count()
    ));
    out.push_str(&format!(
        "Avg fixation:     {:.0}ms\n",
        r.average_fixation_duration_ms
    ));
    out.push_str(&format!(
        "Read time:        {}\n",
        format_read_time(r.total_read_time_ms)
    ));
    out.push_str(&format!(
        "Pages read:       {} / {}\n",
        r.pages_read, r.total_pages
    ));
    out.push_str(&format!(
        "Samples:          {} ({} rejected, {} malformed)\n",
        sum.stats.samples, sum.stats.rejected, sum.stats.malformed
    ));
    out.push_str(&format!("Drift warnings:   {warnings}\n"));
    for d in sum.drift_reports.iter().filter(|d| d.status != DriftStatus::Ok) {
        out.push_str(&format!(
            "  [{}] {}\n",
            format_clock(d.at_ms - sum.started_at_ms),
            d.message()
        ));
    }
    if with_fixations {
        out.push_str("Fixations:\n");
        for f in &sum.fixations {
            let target = f.target.as_ref().map_or("-", |t| t.as_str());
            out.push_str(&format!(
                "  {:>8.0}ms  {:>5.0}ms  ({:.0}, {:.0})  {target}\n",
                f.start_time_ms - sum.started_at_ms,
                f.duration_ms,
                f.x,
                f.y
            ));
        }
    }
    out
}

pub fn summary_json(sum: &RunSummary, total_spans: usize, with_fixations: bool) -> Value {
    let r = &sum.result;
    let spans: serde_json::Map<String, Value> = r
        .read_map
        .iter()
        .map(|(id, st)| {
            (
                id.as_str().to_string(),
                json!({
                    "dwell_ms": st.total_dwell_ms,
                    "fixations": st.fixation_count,
                    "read": st.is_read,
                }),
            )
        })
        .collect();
    let drift: Vec<Value> = sum
        .drift_reports
        .iter()
        .map(|d| {
            let message = (d.status != DriftStatus::Ok).then(|| d.message());
            json!({
                "at_ms": d.at_ms,
                "status": d.status.as_str(),
                "off_screen_ratio": d.off_screen_ratio,
                "message": message,
            })
        })
        .collect();

    let mut v = json!({
        "timestamp": r.timestamp_ms,
        "started_at_ms": sum.started_at_ms,
        "verdict": r.verdict.as_str(),
        "label": r.verdict.label(),
        "coverage_percent": r.coverage_percent,
        "read_spans": r.read_count(),
        "total_spans": total_spans,
        "average_fixation_ms": r.average_fixation_duration_ms,
        "total_read_time_ms": r.total_read_time_ms,
        "pages_read": r.pages_read,
        "total_pages": r.total_pages,
        "samples": sum.stats.samples,
        "rejected": sum.stats.rejected,
        "malformed": sum.stats.malformed,
        "fixation_count": sum.stats.fixations,
        "drift": drift,
        "spans": spans,
    });
    if with_fixations {
        v["fixations"] = sum
            .fixations
            .iter()
            .map(|f| {
                json!({
                    "x": f.x,
                    "y": f.y,
                    "start_ms": f.start_time_ms,
                    "duration_ms": f.duration_ms,
                    "target": f.target.as_ref().map(|t| t.as_str()),
                })
            })
            .collect();
    }
    v
}

pub fn render_calibration(report: &CalibrationReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Calibration:      {} ({:.1}px average error)\n",
        report.quality, report.average_error_px
    ));
    out.push_str(&format!(
        "Fixation radius:  {:.0}px\n",
        report.fixation_radius_px()
    ));
    out.push_str("Targets:\n");
    for t in &report.targets {
        out.push_str(&format!(
            "  ({:.0}, {:.0})  {:>6.1}px  n={}\n",
            t.target_x, t.target_y, t.average_error_px, t.samples
        ));
    }
    out
}

pub fn calibration_json(report: &CalibrationReport) -> Value {
    json!({
        "timestamp": unix_timestamp(),
        "average_error_px": report.average_error_px,
        "quality": report.quality.as_str(),
        "fixation_radius_px": report.fixation_radius_px(),
        "targets": report
            .targets
            .iter()
            .map(|t| json!({
                "x": t.target_x,
                "y": t.target_y,
                "samples": t.samples,
                "average_error_px": t.average_error_px,
            }))
            .collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "0m 0s")]
    #[case(999.0, "0m 0s")]
    #[case(61_500.0, "1m 1s")]
    #[case(3_600_000.0, "60m 0s")]
    #[case(-5.0, "0m 0s")]
    #[case(f64::NAN, "0m 0s")]
    fn read_time_formatting(#[case] ms: f64, #[case] want: &str) {
        assert_eq!(format_read_time(ms), want);
    }

    #[test]
    fn clock_pads_seconds() {
        assert_eq!(format_clock(65_000.0), "1:05");
    }
}

//! Reduce a session's read map to coverage, average fixation and a verdict.

use std::collections::BTreeSet;
use std::fmt;

use crate::tracker::{ReadMap, coverage_percent};

/// Coverage (%) needed for `Verified`, together with `VERIFIED_MIN_AVG_FIXATION_MS`.
pub const VERIFIED_MIN_COVERAGE: f64 = 80.0;
pub const VERIFIED_MIN_AVG_FIXATION_MS: f64 = 100.0;
pub const PARTIAL_MIN_COVERAGE: f64 = 40.0;
/// `Skimmed` needs strictly more than this.
pub const SKIMMED_COVERAGE_FLOOR: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Verified,
    Partial,
    Skimmed,
    Insufficient,
}

impl Verdict {
    pub fn classify(coverage_percent: f64, average_fixation_ms: f64) -> Self {
        if coverage_percent >= VERIFIED_MIN_COVERAGE
            && average_fixation_ms >= VERIFIED_MIN_AVG_FIXATION_MS
        {
            Verdict::Verified
        } else if coverage_percent >= PARTIAL_MIN_COVERAGE {
            Verdict::Partial
        } else if coverage_percent > SKIMMED_COVERAGE_FLOOR {
            Verdict::Skimmed
        } else {
            Verdict::Insufficient
        }
    }

    /// Short machine-readable form.
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Verified => "verified",
            Verdict::Partial => "partial",
            Verdict::Skimmed => "skimmed",
            Verdict::Insufficient => "insufficient",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::Verified => "Verified Read",
            Verdict::Partial => "Partial Read",
            Verdict::Skimmed => "Skimmed",
            Verdict::Insufficient => "Insufficient Data",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct VerificationInput<'a> {
    pub read_map: &'a ReadMap,
    pub total_spans: usize,
    /// Wall time of the reading session.
    pub total_read_time_ms: f64,
    pub pages_read: usize,
    pub total_pages: usize,
    /// Stamp copied into the result.
    pub timestamp_ms: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    pub coverage_percent: f64,
    pub average_fixation_duration_ms: f64,
    pub total_read_time_ms: f64,
    pub pages_read: usize,
    pub total_pages: usize,
    pub verdict: Verdict,
    pub read_map: ReadMap,
    pub timestamp_ms: f64,
}

impl VerificationResult {
    pub fn read_count(&self) -> usize {
        self.read_map.values().filter(|s| s.is_read).count()
    }
}

/// Score a read map. Pure: the same input always gives the same result.
pub fn compute_verification(input: &VerificationInput<'_>) -> VerificationResult {
    let mut read_count = 0usize;
    let mut total_dwell = 0.0;
    let mut total_fixations = 0u64;
    for region in input.read_map.values() {
        if region.is_read {
            read_count += 1;
        }
        total_dwell += region.total_dwell_ms;
        total_fixations += u64::from(region.fixation_count);
    }

    let coverage = coverage_percent(read_count, input.total_spans);
    let average = if total_fixations == 0 {
        0.0
    } else {
        total_dwell / total_fixations as f64
    };

    VerificationResult {
        coverage_percent: coverage,
        average_fixation_duration_ms: average,
        total_read_time_ms: input.total_read_time_ms,
        pages_read: input.pages_read,
        total_pages: input.total_pages,
        verdict: Verdict::classify(coverage, average),
        read_map: input.read_map.clone(),
        timestamp_ms: input.timestamp_ms,
    }
}

/// Distinct pages holding at least one read span, from `page-{n}-...` ids.
pub fn pages_read(read_map: &ReadMap) -> usize {
    read_map
        .iter()
        .filter(|(_, s)| s.is_read)
        .filter_map(|(id, _)| id.page_index())
        .collect::<BTreeSet<_>>()
        .len()
}

//! Per-span dwell accumulation and read classification.

use std::collections::BTreeMap;

use gaze_traits::SpanId;

use crate::config::TrackingCfg;
use crate::fixation::Fixation;

/// Accumulated attention for one span.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionReadState {
    pub total_dwell_ms: f64,
    pub fixation_count: u32,
    pub first_fixation_ms: f64,
    pub last_fixation_ms: f64,
    /// Latched: once set it stays set for the session.
    pub is_read: bool,
}

/// Span id → accumulated state. Keys are unique; order carries no meaning.
pub type ReadMap = BTreeMap<SpanId, RegionReadState>;

/// Display status of a span.
///
/// There is deliberately no separate "fixated" state: a span with any dwell
/// below the read threshold is `Partial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    Unread,
    Partial,
    Read,
}

impl ReadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReadStatus::Unread => "unread",
            ReadStatus::Partial => "partial",
            ReadStatus::Read => "read",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReadTracker {
    read_threshold_ms: f64,
    regions: ReadMap,
}

impl ReadTracker {
    pub fn new(cfg: &TrackingCfg) -> Self {
        Self {
            read_threshold_ms: cfg.read_threshold_ms,
            regions: ReadMap::new(),
        }
    }

    pub fn read_threshold_ms(&self) -> f64 {
        self.read_threshold_ms
    }

    /// Attribute a fixation to its span. Fixations without a target are ignored.
    ///
    /// Returns the span's updated state when something was recorded.
    pub fn record_fixation(&mut self, fixation: &Fixation) -> Option<&RegionReadState> {
        let id = fixation.target.as_ref()?;
        let duration = fixation.duration_ms.max(0.0);
        let end = fixation.start_time_ms + duration;
        let threshold = self.read_threshold_ms;

        let state = self
            .regions
            .entry(id.clone())
            .and_modify(|s| {
                s.total_dwell_ms += duration;
                s.fixation_count = s.fixation_count.saturating_add(1);
                s.last_fixation_ms = end;
                s.is_read = s.is_read || s.total_dwell_ms >= threshold;
            })
            .or_insert_with(|| RegionReadState {
                total_dwell_ms: duration,
                fixation_count: 1,
                first_fixation_ms: fixation.start_time_ms,
                last_fixation_ms: end,
                is_read: duration >= threshold,
            });

        if state.is_read && state.fixation_count > 1 && state.total_dwell_ms - duration < threshold
        {
            tracing::debug!(span_id = %id, dwell_ms = state.total_dwell_ms, "span read");
        }
        Some(state)
    }

    pub fn status(&self, id: &SpanId) -> ReadStatus {
        match self.regions.get(id) {
            Some(s) if s.is_read => ReadStatus::Read,
            Some(s) if s.total_dwell_ms > 0.0 => ReadStatus::Partial,
            _ => ReadStatus::Unread,
        }
    }

    pub fn get(&self, id: &SpanId) -> Option<&RegionReadState> {
        self.regions.get(id)
    }

    pub fn read_map(&self) -> &ReadMap {
        &self.regions
    }

    /// Owned copy of the map for scoring or reporting.
    pub fn snapshot(&self) -> ReadMap {
        self.regions.clone()
    }

    pub fn read_count(&self) -> usize {
        self.regions.values().filter(|s| s.is_read).count()
    }

    /// Percentage of `total_regions` that are read; 0 when there are none.
    pub fn coverage_percent(&self, total_regions: usize) -> f64 {
        coverage_percent(self.read_count(), total_regions)
    }

    /// Total dwell divided by total fixations over all tracked spans.
    pub fn average_fixation_duration(&self) -> f64 {
        let (dwell, count) = self
            .regions
            .values()
            .fold((0.0, 0u64), |(d, c), s| (d + s.total_dwell_ms, c + u64::from(s.fixation_count)));
        if count == 0 { 0.0 } else { dwell / count as f64 }
    }

    pub fn reset(&mut self) {
        self.regions.clear();
    }
}

impl Default for ReadTracker {
    fn default() -> Self {
        Self::new(&TrackingCfg::default())
    }
}

/// `100 * read / total`, 0 for an empty document, never above 100.
#[inline]
pub fn coverage_percent(read: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (read as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

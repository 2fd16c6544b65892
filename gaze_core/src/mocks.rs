//! Test and helper collaborators for gaze_core

use std::collections::VecDeque;
use std::time::Duration;

use gaze_traits::{BoxError, GazeSample, GazeSource, SpanId, SpanLocator};

/// A locator over an empty document: every hit-test misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLocator;

impl SpanLocator for NullLocator {
    fn hit_test(&self, _x: f64, _y: f64) -> Option<SpanId> {
        None
    }

    fn total_span_count(&self) -> usize {
        0
    }
}

/// A locator that resolves every point to the same span.
#[derive(Debug, Clone)]
pub struct FixedLocator {
    id: SpanId,
    total: usize,
}

impl FixedLocator {
    pub fn new(id: impl Into<SpanId>, total: usize) -> Self {
        Self {
            id: id.into(),
            total,
        }
    }
}

impl SpanLocator for FixedLocator {
    fn hit_test(&self, _x: f64, _y: f64) -> Option<SpanId> {
        Some(self.id.clone())
    }

    fn total_span_count(&self) -> usize {
        self.total
    }
}

/// A source that yields a fixed list of samples, then reports end of stream.
///
/// Timeouts are ignored; samples are handed out as fast as they are pulled.
#[derive(Debug, Default, Clone)]
pub struct VecSource {
    samples: VecDeque<GazeSample>,
}

impl VecSource {
    pub fn new(samples: impl IntoIterator<Item = GazeSample>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }
}

impl GazeSource for VecSource {
    fn next_sample(&mut self, _timeout: Duration) -> Result<Option<GazeSample>, BoxError> {
        Ok(self.samples.pop_front())
    }
}

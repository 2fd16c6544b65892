pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

use std::fmt;

/// Error type returned by external collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Assumed span density when a renderer does not report its page count.
pub const SPANS_PER_PAGE_ESTIMATE: usize = 50;

/// One raw gaze estimate in screen coordinates.
///
/// `timestamp_ms` is monotonically non-decreasing within a stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeSample {
    pub x: f64,
    pub y: f64,
    pub timestamp_ms: f64,
}

impl GazeSample {
    #[inline]
    pub const fn new(x: f64, y: f64, timestamp_ms: f64) -> Self {
        Self { x, y, timestamp_ms }
    }

    /// True when both coordinates and the timestamp are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.timestamp_ms.is_finite()
    }
}

/// Stable identifier of the smallest addressable text region of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanId(String);

impl SpanId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the `page-{page}-span-{index}` form used by the span registry.
    pub fn for_page(page: usize, index: usize) -> Self {
        Self(format!("page-{page}-span-{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Page index encoded in a `page-{n}-...` id, if any.
    pub fn page_index(&self) -> Option<usize> {
        let rest = self.0.strip_prefix("page-")?;
        let end = rest.find('-')?;
        rest[..end].parse().ok()
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SpanId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SpanId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Document renderer lookup: resolves screen points to spans.
pub trait SpanLocator {
    /// Span under the given screen point, if any.
    fn hit_test(&self, x: f64, y: f64) -> Option<SpanId>;

    /// Number of spans in the currently rendered document.
    fn total_span_count(&self) -> usize;

    /// Number of pages in the document. Defaults to an estimate from the span count.
    fn total_page_count(&self) -> usize {
        self.total_span_count().div_ceil(SPANS_PER_PAGE_ESTIMATE)
    }
}

impl<L: SpanLocator + ?Sized> SpanLocator for Box<L> {
    fn hit_test(&self, x: f64, y: f64) -> Option<SpanId> {
        (**self).hit_test(x, y)
    }
    fn total_span_count(&self) -> usize {
        (**self).total_span_count()
    }
    fn total_page_count(&self) -> usize {
        (**self).total_page_count()
    }
}

/// Upstream gaze estimator, pulled one sample at a time.
pub trait GazeSource {
    /// Wait up to `timeout` for the next sample.
    ///
    /// `Ok(None)` signals the end of the stream.
    fn next_sample(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<Option<GazeSample>, BoxError>;
}

//! Rectangle-based span registry.
//!
//! Spans are hit-tested in insertion order; the first rectangle containing
//! the point wins. Edges are inclusive on the left/top and exclusive on the
//! right/bottom so adjacent spans never both claim a point.

use std::collections::BTreeSet;

use gaze_traits::{SpanId, SpanLocator};

#[derive(Debug, Clone, PartialEq)]
pub struct SpanRect {
    pub id: SpanId,
    pub page: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SpanRect {
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

#[derive(Debug, Clone, Default)]
pub struct RectLayout {
    spans: Vec<SpanRect>,
    pages: BTreeSet<usize>,
}

impl RectLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        id: impl Into<SpanId>,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) {
        self.pages.insert(page);
        self.spans.push(SpanRect {
            id: id.into(),
            page,
            x,
            y,
            width,
            height,
        });
    }

    pub fn spans(&self) -> &[SpanRect] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

impl SpanLocator for RectLayout {
    fn hit_test(&self, x: f64, y: f64) -> Option<SpanId> {
        self.spans
            .iter()
            .find(|r| r.contains(x, y))
            .map(|r| r.id.clone())
    }

    fn total_span_count(&self) -> usize {
        self.spans.len()
    }

    fn total_page_count(&self) -> usize {
        self.pages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_lines() -> RectLayout {
        let mut l = RectLayout::new();
        l.push("page-1-span-0", 1, 0.0, 0.0, 100.0, 20.0);
        l.push("page-1-span-1", 1, 0.0, 20.0, 100.0, 20.0);
        l.push("page-2-span-0", 2, 0.0, 900.0, 100.0, 20.0);
        l
    }

    #[test]
    fn hit_inside_and_miss_outside() {
        let l = two_lines();
        assert_eq!(l.hit_test(50.0, 10.0), Some(SpanId::new("page-1-span-0")));
        assert_eq!(l.hit_test(500.0, 10.0), None);
    }

    #[test]
    fn shared_edge_belongs_to_lower_span() {
        let l = two_lines();
        assert_eq!(l.hit_test(10.0, 20.0), Some(SpanId::new("page-1-span-1")));
    }

    #[test]
    fn counts_spans_and_distinct_pages() {
        let l = two_lines();
        assert_eq!(l.total_span_count(), 3);
        assert_eq!(l.total_page_count(), 2);
        assert_eq!(RectLayout::new().total_page_count(), 0);
    }
}

//! Pass-through spans punched into the paddle by enemy projectiles

use serde::{Deserialize, Serialize};

/// Half-open interval `[start, end)` in paddle-relative coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: f32,
    pub end: f32,
}

impl Span {
    pub fn width(&self) -> f32 {
        self.end - self.start
    }
}

/// Sorted, non-overlapping spans. Inserting merges with any span it touches,
/// so the set never holds more spans than fit side by side on the paddle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoleSet {
    spans: Vec<Span>,
}

impl HoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a hole of `width` starting at `offset`, clipped to `[0, limit]`
    pub fn insert(&mut self, offset: f32, width: f32, limit: f32) {
        let mut start = offset.max(0.0);
        let mut end = (offset + width).min(limit);
        if !(end > start) {
            return;
        }

        // First span whose end reaches the new start
        let first = self.spans.partition_point(|s| s.end < start);
        let mut last = first;
        while last < self.spans.len() && self.spans[last].start <= end {
            start = start.min(self.spans[last].start);
            end = end.max(self.spans[last].end);
            last += 1;
        }
        self.spans.splice(first..last, std::iter::once(Span { start, end }));
    }

    /// Whether a paddle-relative x falls inside a hole
    pub fn contains(&self, x: f32) -> bool {
        let idx = self.spans.partition_point(|s| s.end <= x);
        self.spans.get(idx).is_some_and(|s| s.start <= x)
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_disjoint_keeps_order() {
        let mut holes = HoleSet::new();
        holes.insert(60.0, 9.0, 120.0);
        holes.insert(10.0, 9.0, 120.0);
        assert_eq!(
            holes.spans(),
            &[Span { start: 10.0, end: 19.0 }, Span { start: 60.0, end: 69.0 }]
        );
    }

    #[test]
    fn test_overlapping_inserts_merge() {
        let mut holes = HoleSet::new();
        holes.insert(10.0, 9.0, 120.0);
        holes.insert(30.0, 9.0, 120.0);
        holes.insert(15.0, 20.0, 120.0);
        assert_eq!(holes.spans(), &[Span { start: 10.0, end: 39.0 }]);
    }

    #[test]
    fn test_touching_spans_merge() {
        let mut holes = HoleSet::new();
        holes.insert(0.0, 10.0, 120.0);
        holes.insert(10.0, 10.0, 120.0);
        assert_eq!(holes.len(), 1);
        assert_eq!(holes.spans()[0].width(), 20.0);
    }

    #[test]
    fn test_clipped_to_paddle() {
        let mut holes = HoleSet::new();
        holes.insert(-4.0, 9.0, 120.0);
        holes.insert(116.0, 9.0, 120.0);
        holes.insert(130.0, 9.0, 120.0);
        assert_eq!(
            holes.spans(),
            &[Span { start: 0.0, end: 5.0 }, Span { start: 116.0, end: 120.0 }]
        );
    }

    #[test]
    fn test_contains_is_half_open() {
        let mut holes = HoleSet::new();
        holes.insert(20.0, 10.0, 120.0);
        assert!(!holes.contains(19.9));
        assert!(holes.contains(20.0));
        assert!(holes.contains(29.9));
        assert!(!holes.contains(30.0));
    }

    #[test]
    fn test_repeated_hits_stay_bounded() {
        let mut holes = HoleSet::new();
        for i in 0..1000 {
            holes.insert((i % 13) as f32 * 9.0, 9.0, 120.0);
        }
        assert_eq!(holes.len(), 1);
        assert_eq!(holes.spans()[0], Span { start: 0.0, end: 117.0 });
    }
}

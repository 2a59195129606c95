//! Source spans
//!
//! Character-offset ranges into the original source text.

use serde::{Deserialize, Serialize};

/// Half-open range `[start, end)` of character offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Placeholder span for synthesized nodes
    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    /// Smallest span covering both `self` and `other`
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_orders_bounds() {
        let a = Span::new(4, 6);
        let b = Span::new(1, 2);
        assert_eq!(a.merge(b), Span::new(1, 6));
        assert_eq!(b.merge(a), Span::new(1, 6));
    }

    #[test]
    fn test_len() {
        assert_eq!(Span::new(3, 7).len(), 4);
        assert!(Span::dummy().is_empty());
    }
}

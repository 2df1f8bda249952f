use thiserror::Error;

/// Half-open byte range into the normalized source text.
///
/// Every AST node carries one so callers can map rendered output back to the
/// markup that produced it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Result<Self, SpanError> {
        if start <= end {
            Ok(Self { start, end })
        } else {
            Err(SpanError::Inverted { start, end })
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn union(&self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum SpanError {
    #[error("inverted span: start {start} > end {end}")]
    Inverted { start: usize, end: usize },
}

#[cfg(test)]
mod tests {
    use super::Span;

    #[test]
    fn union_and_containment() {
        let a = Span { start: 2, end: 5 };
        let b = Span { start: 4, end: 9 };
        assert_eq!(a.union(b), Span { start: 2, end: 9 });
        assert!(a.contains(2));
        assert!(!a.contains(5));
    }

    #[test]
    fn new_rejects_inverted() {
        assert!(Span::new(3, 1).is_err());
        assert_eq!(Span::new(1, 3).unwrap().len(), 2);
    }
}

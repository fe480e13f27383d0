//! Span - Source code location
//!
//! A Span is a byte range into an Oat source buffer together with the
//! line/column of both ends, so diagnostics can point at it precisely.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A position in the source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    /// Line (1-indexed)
    pub line: u32,
    /// Column (1-indexed, counted in chars)
    pub column: u32,
    /// Byte offset from the beginning of the buffer
    pub offset: usize,
}

impl Position {
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self { line, column, offset }
    }

    /// The position right at the start of a buffer
    pub fn start() -> Self {
        Self::new(1, 1, 0)
    }
}

/// A region in the source code (start inclusive, end exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Span {
    pub start: Position,
    pub end: Position,
    /// Source buffer ID, as handed out by `SourceCache::add`
    pub file_id: u32,
}

impl Span {
    pub fn new(start: Position, end: Position, file_id: u32) -> Self {
        Self { start, end, file_id }
    }

    /// Creates an empty span at a single position
    pub fn point(pos: Position, file_id: u32) -> Self {
        Self {
            start: pos,
            end: pos,
            file_id,
        }
    }

    /// Empty span sitting right after this one
    pub fn after(self) -> Span {
        Span::point(self.end, self.file_id)
    }

    /// Combines two spans, creating one that covers both
    pub fn merge(self, other: Span) -> Span {
        debug_assert_eq!(self.file_id, other.file_id, "Cannot merge spans from different files");
        Span {
            start: if self.start.offset <= other.start.offset {
                self.start
            } else {
                other.start
            },
            end: if self.end.offset >= other.end.offset {
                self.end
            } else {
                other.end
            },
            file_id: self.file_id,
        }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The slice of `source` this span covers
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start.offset..self.end.offset).unwrap_or("")
    }
}

/// Trait for types that have a location in the code
pub trait Spanned {
    fn span(&self) -> Span;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge() {
        let span1 = Span::new(Position::new(1, 1, 0), Position::new(1, 5, 4), 0);
        let span2 = Span::new(Position::new(1, 10, 9), Position::new(1, 15, 14), 0);

        let merged = span1.merge(span2);
        assert_eq!(merged.start.offset, 0);
        assert_eq!(merged.end.offset, 14);
        assert_eq!(span2.merge(span1), merged);
    }

    #[test]
    fn test_span_after_is_empty_at_end() {
        let span = Span::new(Position::new(2, 3, 10), Position::new(2, 4, 11), 0);
        let after = span.after();
        assert!(after.is_empty());
        assert_eq!(after.start, Position::new(2, 4, 11));
    }

    #[test]
    fn test_span_slice() {
        let source = "var x = 1;";
        let span = Span::new(Position::new(1, 5, 4), Position::new(1, 6, 5), 0);
        assert_eq!(span.slice(source), "x");
        assert_eq!(span.len(), 1);
    }
}

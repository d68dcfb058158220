//! Line ranges within source files for tracking node locations.

use crate::file_id::FileId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive 1-based line range within a source file.
///
/// Spans track where a signal, expression, or statement came from in the
/// HDL source. Multi-line constructs (a whole `always` block, a wrapped
/// expression) cover `line_start..=line_end`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Span {
    /// The source file this span belongs to.
    pub file: FileId,
    /// First source line (1-based, inclusive).
    pub line_start: u32,
    /// Last source line (1-based, inclusive).
    pub line_end: u32,
}

impl Span {
    /// A dummy span used when no source location is available.
    pub const DUMMY: Span = Span {
        file: FileId::DUMMY,
        line_start: 0,
        line_end: 0,
    };

    /// Creates a new span in the given file covering the given line range.
    pub fn new(file: FileId, line_start: u32, line_end: u32) -> Self {
        Self {
            file,
            line_start,
            line_end,
        }
    }

    /// Creates a single-line span.
    pub fn line(file: FileId, line: u32) -> Self {
        Self::new(file, line, line)
    }

    /// Merges two spans in the same file, producing a span that covers both.
    ///
    /// # Panics
    ///
    /// Panics if the two spans are from different files.
    pub fn merge(self, other: Span) -> Span {
        assert_eq!(
            self.file, other.file,
            "cannot merge spans from different files"
        );
        Span {
            file: self.file,
            line_start: self.line_start.min(other.line_start),
            line_end: self.line_end.max(other.line_end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line_start == self.line_end {
            write!(f, "line {}", self.line_start)
        } else {
            write!(f, "lines {}-{}", self.line_start, self.line_end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line() {
        let s = Span::line(FileId::from_raw(0), 12);
        assert_eq!(s.line_start, 12);
        assert_eq!(s.line_end, 12);
        assert_eq!(s.to_string(), "line 12");
    }

    #[test]
    fn multi_line_display() {
        let s = Span::new(FileId::from_raw(0), 4, 9);
        assert_eq!(s.to_string(), "lines 4-9");
    }

    #[test]
    fn merge_covers_both() {
        let f = FileId::from_raw(1);
        let a = Span::new(f, 5, 7);
        let b = Span::new(f, 6, 12);
        let m = a.merge(b);
        assert_eq!(m.line_start, 5);
        assert_eq!(m.line_end, 12);
    }

    #[test]
    #[should_panic(expected = "different files")]
    fn merge_rejects_cross_file() {
        let a = Span::line(FileId::from_raw(0), 1);
        let b = Span::line(FileId::from_raw(1), 1);
        let _ = a.merge(b);
    }

    #[test]
    fn serde_roundtrip() {
        let s = Span::new(FileId::from_raw(2), 3, 4);
        let json = serde_json::to_string(&s).unwrap();
        let back: Span = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}

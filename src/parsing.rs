//! Source locations shared by the parsers, the assembler and the symbol lookup.

use std::fmt;
use std::ops::Range;

/// A half-open column range on a single source line.
///
/// All fields are zero-based. Columns are counted in characters, not bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceSpan {
    /// Zero-based line number.
    pub line: usize,
    /// First column covered by the span.
    pub start_col: usize,
    /// First column after the span.
    pub end_col: usize,
}

impl SourceSpan {
    pub fn new(line: usize, start_col: usize, end_col: usize) -> SourceSpan {
        SourceSpan {
            line,
            start_col,
            end_col,
        }
    }

    /// Builds a span from a byte range within `text`, which must be the whole line.
    pub fn from_byte_range(line: usize, text: &str, range: Range<usize>) -> SourceSpan {
        SourceSpan {
            line,
            start_col: char_column(text, range.start),
            end_col: char_column(text, range.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end_col - self.start_col
    }

    pub fn is_empty(&self) -> bool {
        self.start_col == self.end_col
    }

    /// Returns the smallest span covering both `self` and `other`.
    ///
    /// Both spans are expected to be on the same line; the line of `self` is kept.
    pub fn join(&self, other: &SourceSpan) -> SourceSpan {
        SourceSpan {
            line: self.line,
            start_col: std::cmp::min(self.start_col, other.start_col),
            end_col: std::cmp::max(self.end_col, other.end_col),
        }
    }

    /// True if the cursor at `pos` touches this span.
    ///
    /// The end column is included, so a cursor placed right after a word still selects it.
    pub fn contains(&self, pos: Position) -> bool {
        self.line == pos.line && self.start_col <= pos.column && pos.column <= self.end_col
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}-{}", self.line + 1, self.start_col + 1, self.end_col + 1)
    }
}

/// A zero-based cursor position in a source file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Position {
        Position { line, column }
    }
}

/// Converts a byte offset within `text` into a character column.
pub fn char_column(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset].chars().count()
}

/// Byte offset of `rest` within `input`, where `rest` is a suffix of `input`.
pub(crate) fn offset_of(input: &str, rest: &str) -> usize {
    input.len() - rest.len()
}

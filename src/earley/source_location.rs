//! Source positions, spans and line highlighting
//!
//! Tokens carry their own line/column, so nothing here re-lexes the input;
//! the source text is only needed to print the offending line.

use std::fmt;
use std::fmt::Write as _;

/// A position in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourcePosition {
    /// Byte offset from start of input
    pub offset: usize,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, counted in chars)
    pub column: usize,
}

impl SourcePosition {
    /// Create a new source position
    #[inline]
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Position of the first character of the input
    #[inline]
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Compute the position of a byte offset. Offsets past the end clamp to
    /// the end of the input; offsets inside a character move back to its
    /// first byte.
    pub fn from_offset(input: &str, offset: usize) -> Self {
        let offset = char_floor(input, offset);
        let bytes = &input.as_bytes()[..offset];
        let line = 1 + memchr::memchr_iter(b'\n', bytes).count();
        let line_start = memchr::memrchr(b'\n', bytes).map_or(0, |nl| nl + 1);
        let column = 1 + input[line_start..offset].chars().count();
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A half-open range of source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceSpan {
    /// First position covered
    pub start: SourcePosition,
    /// Position just past the covered text
    pub end: SourcePosition,
}

impl SourceSpan {
    /// Create a new span
    #[inline]
    pub fn new(start: SourcePosition, end: SourcePosition) -> Self {
        Self { start, end }
    }

    /// Zero-length span at a position
    #[inline]
    pub fn point(pos: SourcePosition) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Span from two byte offsets
    pub fn from_offsets(input: &str, start: usize, end: usize) -> Self {
        Self {
            start: SourcePosition::from_offset(input, start),
            end: SourcePosition::from_offset(input, end),
        }
    }

    /// Length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    /// Whether the span covers no text
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest span covering both
    pub fn merge(&self, other: &SourceSpan) -> SourceSpan {
        let start = if self.start.offset <= other.start.offset {
            self.start
        } else {
            other.start
        };
        let end = if self.end.offset >= other.end.offset {
            self.end
        } else {
            other.end
        };
        SourceSpan { start, end }
    }

    /// Slice of `input` covered by the span (empty if out of range)
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        input
            .get(self.start.offset..self.end.offset.min(input.len()))
            .unwrap_or("")
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "{}", self.start)
        } else if self.start.line == self.end.line {
            write!(
                f,
                "line {}, columns {}-{}",
                self.start.line,
                self.start.column,
                self.end.column.saturating_sub(1).max(self.start.column)
            )
        } else {
            write!(
                f,
                "line {}, column {} to line {}, column {}",
                self.start.line, self.start.column, self.end.line, self.end.column
            )
        }
    }
}

/// Largest char boundary of `input` at or before `offset`
pub fn char_floor(input: &str, offset: usize) -> usize {
    let mut offset = offset.min(input.len());
    while !input.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Byte range `(start, end)` of the line containing `offset`, without the
/// trailing newline.
pub fn line_bounds(input: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(input.len());
    let bytes = input.as_bytes();
    let start = memchr::memrchr(b'\n', &bytes[..offset]).map_or(0, |nl| nl + 1);
    let end = memchr::memchr(b'\n', &bytes[offset..]).map_or(input.len(), |nl| offset + nl);
    (start, end)
}

/// Render the line containing `span.start` with a caret underline.
///
/// ```text
///    1 | {1:2}
///      |  ^
/// ```
///
/// Spans running past the end of the line are underlined up to the line end;
/// an empty span gets a single caret.
pub fn highlight(input: &str, span: SourceSpan) -> String {
    let from = char_floor(input, span.start.offset);
    let (start, end) = line_bounds(input, from);
    let line = &input[start..end];
    let lead = input[start..from.min(end)].chars().count();
    let width = input
        .get(from.min(end)..char_floor(input, span.end.offset).clamp(start, end))
        .map_or(0, |s| s.chars().count())
        .max(1);

    let mut out = String::new();
    let _ = writeln!(out, "{:4} | {}", span.start.line, line.trim_end_matches('\r'));
    let _ = writeln!(out, "     | {}{}", " ".repeat(lead), "^".repeat(width));
    out
}

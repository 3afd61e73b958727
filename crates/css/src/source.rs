//! Source positions for tokens and tree nodes.

use core::fmt;

use serde::Serialize;

/// A 1-based line/column location in the stylesheet source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open range of char offsets into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Maps char offsets to line/column pairs.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Char offset at which each line starts. Always contains `0`.
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(chars: &[char]) -> Self {
        let mut line_starts = vec![0];
        for (i, &ch) in chars.iter().enumerate() {
            if ch == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    pub fn position(&self, offset: usize) -> SourcePosition {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        SourcePosition::new(line + 1, offset - self.line_starts[line] + 1)
    }
}

//! Source locations attached to syntax nodes.
//!
//! Positions are stored zero-based, matching Tree-sitter. Reporting layers
//! call [`LineCol::one_based`] when rendering for humans.

use serde::{Deserialize, Serialize};

/// A zero-based line and column position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineCol {
    /// Zero-based line number.
    pub line: u32,
    /// Zero-based column, in bytes from the start of the line.
    pub column: u32,
}

impl LineCol {
    /// Creates a new position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Returns the position as one-based `(line, column)` for display.
    #[must_use]
    pub const fn one_based(self) -> (u32, u32) {
        (self.line.saturating_add(1), self.column.saturating_add(1))
    }

    pub(crate) fn from_point(point: tree_sitter::Point) -> Self {
        // Files large enough to overflow u32 are clamped rather than wrapped.
        Self {
            line: u32::try_from(point.row).unwrap_or(u32::MAX),
            column: u32::try_from(point.column).unwrap_or(u32::MAX),
        }
    }
}

/// A half-open byte range plus its line/column endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start_byte: usize,
    /// End byte offset (exclusive).
    pub end_byte: usize,
    /// Start position.
    pub start: LineCol,
    /// End position.
    pub end: LineCol,
}

impl Span {
    /// Creates a span from byte offsets and positions.
    #[must_use]
    pub const fn new(start_byte: usize, end_byte: usize, start: LineCol, end: LineCol) -> Self {
        Self {
            start_byte,
            end_byte,
            start,
            end,
        }
    }

    /// Returns the covered text, or an empty string when the span does not
    /// fit `source`.
    #[must_use]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.start_byte..self.end_byte).unwrap_or_default()
    }

    /// Returns the full text of the line the span starts on, without the
    /// trailing newline.
    #[must_use]
    pub fn first_line<'s>(&self, source: &'s str) -> &'s str {
        let line_start = source
            .get(..self.start_byte)
            .and_then(|head| head.rfind('\n'))
            .map_or(0, |idx| idx.saturating_add(1));
        let rest = source.get(line_start..).unwrap_or_default();
        rest.split('\n').next().unwrap_or_default().trim_end_matches('\r')
    }

    pub(crate) fn from_node(node: tree_sitter::Node<'_>) -> Self {
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start: LineCol::from_point(node.start_position()),
            end: LineCol::from_point(node.end_position()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_based_adds_one_to_each_axis() {
        assert_eq!(LineCol::new(0, 0).one_based(), (1, 1));
        assert_eq!(LineCol::new(4, 9).one_based(), (5, 10));
    }

    #[test]
    fn text_returns_covered_region() {
        let span = Span::new(4, 9, LineCol::new(0, 4), LineCol::new(0, 9));
        assert_eq!(span.text("let value = 1;"), "value");
    }

    #[test]
    fn text_is_empty_for_out_of_range_span() {
        let span = Span::new(40, 90, LineCol::new(3, 0), LineCol::new(4, 0));
        assert_eq!(span.text("short"), "");
    }

    #[test]
    fn first_line_extracts_the_starting_line() {
        let source = "a = 1\nfoo(bar)\r\nb = 2\n";
        let span = Span::new(10, 13, LineCol::new(1, 4), LineCol::new(1, 7));
        assert_eq!(span.first_line(source), "foo(bar)");
    }
}

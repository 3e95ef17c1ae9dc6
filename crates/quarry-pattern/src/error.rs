//! Pattern compilation errors.

use thiserror::Error;

/// What went wrong while compiling a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PatternErrorKind {
    /// A character that starts no token.
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    /// A string literal without its closing quote.
    #[error("unterminated string literal")]
    UnterminatedString,
    /// A backslash escape the lexer does not know.
    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
    /// A numeric literal that does not fit its type.
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    /// A token that cannot appear here.
    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken {
        /// Description of the token found.
        found: String,
        /// Description of what would have been accepted.
        expected: &'static str,
    },
    /// The input stopped before the pattern was complete.
    #[error("unexpected end of pattern, expected {expected}")]
    UnexpectedEnd {
        /// Description of what would have been accepted.
        expected: &'static str,
    },
    /// `...` followed by another child.
    #[error("'...' must be the last child")]
    EllipsisNotLast,
    /// More than one `...` in one child list.
    #[error("a child list may contain only one '...'")]
    MultipleEllipsis,
    /// `...` outside a child list.
    #[error("'...' is only allowed inside a child list")]
    EllipsisOutsideChildren,
    /// `{}` with no members.
    #[error("alternation needs at least one member")]
    EmptyAlternation,
    /// Tokens left over after a complete pattern.
    #[error("unexpected input after the end of the pattern")]
    TrailingInput,
}

/// A pattern that failed to compile.
///
/// Carries the offending text and the byte offset at which compilation
/// stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at offset {position} in pattern `{pattern}`")]
pub struct PatternSyntaxError {
    pattern: String,
    position: usize,
    kind: PatternErrorKind,
}

impl PatternSyntaxError {
    /// Creates an error for `pattern` at byte offset `position`.
    #[must_use]
    pub fn new(pattern: impl Into<String>, position: usize, kind: PatternErrorKind) -> Self {
        Self {
            pattern: pattern.into(),
            position,
            kind,
        }
    }

    /// Returns the pattern text that failed to compile.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the byte offset of the failure.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the failure category.
    #[must_use]
    pub const fn kind(&self) -> &PatternErrorKind {
        &self.kind
    }

    /// Returns the failure description without location details.
    #[must_use]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

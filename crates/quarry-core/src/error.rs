//! Error types for rule loading and script preparation.

use std::sync::Arc;

use camino::Utf8PathBuf;
use quarry_pattern::PatternSyntaxError;
use quarry_syntax::{SyntaxError, SyntaxErrorInfo};
use thiserror::Error;

/// Errors raised while locating or reading a rule file.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// No rule file exists at any of the candidate locations.
    #[error("rule file not found: {}", candidates.join(", "))]
    NotFound {
        /// Paths that were tried, in order.
        candidates: Vec<String>,
    },

    /// The rule file could not be read.
    #[error("failed to read rule file {path}: {source}")]
    Io {
        /// Path of the rule file.
        path: Utf8PathBuf,
        /// Underlying error wrapped in Arc for Clone support.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The rule file is not valid YAML or does not have the expected shape.
    #[error("invalid rule file {path}: {message}")]
    Parse {
        /// Path of the rule file.
        path: Utf8PathBuf,
        /// Description of the parse failure.
        message: String,
    },
}

impl ConfigError {
    /// Creates a `NotFound` error listing the tried paths.
    #[must_use]
    pub fn not_found<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::NotFound {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an `Io` error.
    #[must_use]
    pub fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a `Parse` error.
    #[must_use]
    pub fn parse(path: impl Into<Utf8PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while building a [`crate::RuleSet`].
///
/// Any one of these aborts rule set construction; partial rule sets are
/// never produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RuleError {
    /// A rule's pattern text does not compile.
    #[error("rule '{rule_id}': invalid pattern `{pattern_text}` at offset {position}: {message}")]
    PatternSyntax {
        /// Identifier of the offending rule.
        rule_id: String,
        /// The pattern text that failed to compile.
        pattern_text: String,
        /// Byte offset of the failure within the pattern.
        position: usize,
        /// Description of the failure.
        message: String,
    },

    /// Two rules share an identifier.
    #[error("duplicate rule id '{rule_id}'")]
    DuplicateId {
        /// The repeated identifier.
        rule_id: String,
    },

    /// A rule declares no pattern.
    #[error("rule '{rule_id}' has no patterns")]
    NoPatterns {
        /// Identifier of the offending rule.
        rule_id: String,
    },

    /// An include or exclude glob is malformed.
    #[error("rule '{rule_id}': invalid glob `{glob}`: {message}")]
    InvalidGlob {
        /// Identifier of the offending rule, or `exclude` for the
        /// file-level exclusion list.
        rule_id: String,
        /// The glob text.
        glob: String,
        /// Description of the failure.
        message: String,
    },

    /// A selected rule id does not exist.
    #[error("unknown rule '{rule_id}'")]
    UnknownRule {
        /// The requested identifier.
        rule_id: String,
    },
}

impl RuleError {
    /// Wraps a pattern compilation failure with the rule that owns it.
    #[must_use]
    pub fn pattern_syntax(rule_id: impl Into<String>, err: &PatternSyntaxError) -> Self {
        Self::PatternSyntax {
            rule_id: rule_id.into(),
            pattern_text: err.pattern().to_owned(),
            position: err.position(),
            message: err.message(),
        }
    }

    /// Creates an `InvalidGlob` error.
    #[must_use]
    pub fn invalid_glob(
        rule_id: impl Into<String>,
        glob: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidGlob {
            rule_id: rule_id.into(),
            glob: glob.into(),
            message: message.into(),
        }
    }

    /// Returns the rule identifier the error refers to.
    #[must_use]
    pub fn rule_id(&self) -> &str {
        match self {
            Self::PatternSyntax { rule_id, .. }
            | Self::DuplicateId { rule_id }
            | Self::NoPatterns { rule_id }
            | Self::InvalidGlob { rule_id, .. }
            | Self::UnknownRule { rule_id } => rule_id,
        }
    }
}

/// Why a script could not be loaded.
///
/// A script error is local to its file: the script is reported once and
/// excluded from matching, and the rest of the run continues.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ScriptError {
    /// The file could not be read.
    #[error("failed to read script: {source}")]
    Io {
        /// Underlying error wrapped in Arc for Clone support.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The path does not map to a supported language.
    #[error("no supported language for {path}")]
    UnsupportedLanguage {
        /// The script path.
        path: Utf8PathBuf,
    },

    /// The parser reported syntax errors; the first one is kept.
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        /// One-based line of the first error.
        line: u32,
        /// One-based column of the first error.
        column: u32,
        /// Description of the first error.
        message: String,
        /// Total number of error nodes reported.
        count: usize,
    },

    /// The parser could not be created or produced no tree.
    #[error("parser failure: {message}")]
    Parser {
        /// Description of the failure.
        message: String,
    },
}

impl ScriptError {
    /// Creates an `Io` error.
    #[must_use]
    pub fn io(source: std::io::Error) -> Self {
        Self::Io {
            source: Arc::new(source),
        }
    }

    /// Creates an `UnsupportedLanguage` error.
    #[must_use]
    pub fn unsupported_language(path: impl Into<Utf8PathBuf>) -> Self {
        Self::UnsupportedLanguage { path: path.into() }
    }

    /// Creates a `Syntax` error from the first reported error and the total
    /// count.
    #[must_use]
    pub fn syntax(first: &SyntaxErrorInfo, count: usize) -> Self {
        Self::Syntax {
            line: first.line,
            column: first.column,
            message: first.message.clone(),
            count,
        }
    }
}

impl From<SyntaxError> for ScriptError {
    fn from(err: SyntaxError) -> Self {
        Self::Parser {
            message: err.to_string(),
        }
    }
}

//! Tree-sitter parsing wrapper.
//!
//! [`Parser`] owns a configured Tree-sitter parser for one language.
//! [`ParseResult`] keeps the concrete tree alongside its source so callers
//! can inspect syntax errors before converting it with
//! [`ParseResult::to_syntax_tree`].

use std::ops::Range;

use crate::convert::to_syntax_node;
use crate::error::SyntaxError;
use crate::language::SupportedLanguage;
use crate::span::LineCol;
use crate::tree::SyntaxNode;

const CONTEXT_LIMIT: usize = 50;

/// The outcome of parsing one source text.
///
/// Tree-sitter recovers from errors, so a result may hold both a usable
/// tree and `ERROR` / `MISSING` nodes. Check [`ParseResult::has_errors`].
#[derive(Debug)]
pub struct ParseResult {
    tree: tree_sitter::Tree,
    source: String,
    language: SupportedLanguage,
}

impl ParseResult {
    /// Returns the source that was parsed.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the language of the parsed source.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Returns the underlying Tree-sitter tree.
    #[must_use]
    pub const fn tree(&self) -> &tree_sitter::Tree {
        &self.tree
    }

    /// Returns whether the tree holds any `ERROR` or `MISSING` node.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Collects every syntax error in document order.
    #[must_use]
    pub fn errors(&self) -> Vec<SyntaxErrorInfo> {
        collect_error_nodes(self.tree.root_node(), &self.source)
    }

    /// Converts the concrete tree into the owned [`SyntaxNode`] model.
    #[must_use]
    pub fn to_syntax_tree(&self) -> SyntaxNode {
        to_syntax_node(self.tree.root_node(), &self.source)
    }

    /// Consumes the result, returning the source text and the converted
    /// tree.
    #[must_use]
    pub fn into_parts(self) -> (String, SyntaxNode) {
        let root = self.to_syntax_tree();
        (self.source, root)
    }
}

/// A syntax error located in the parsed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorInfo {
    /// Byte range of the offending node.
    pub byte_range: Range<usize>,
    /// One-based line where the error starts.
    pub line: u32,
    /// One-based column where the error starts.
    pub column: u32,
    /// The offending text, truncated to fifty characters.
    pub context: String,
    /// Human-readable description.
    pub message: String,
}

impl SyntaxErrorInfo {
    fn from_node(node: tree_sitter::Node<'_>, source: &str) -> Self {
        let byte_range = node.byte_range();
        let context = source
            .get(byte_range.clone())
            .map(|text| {
                if text.chars().count() > CONTEXT_LIMIT {
                    let truncated: String = text.chars().take(CONTEXT_LIMIT - 3).collect();
                    format!("{truncated}...")
                } else {
                    text.to_owned()
                }
            })
            .unwrap_or_default();

        let message = if node.is_missing() {
            format!("missing {}", node.kind())
        } else {
            "syntax error".to_owned()
        };

        let (line, column) = LineCol::from_point(node.start_position()).one_based();

        Self {
            byte_range,
            line,
            column,
            context,
            message,
        }
    }
}

/// A Tree-sitter parser configured for one language.
pub struct Parser {
    inner: tree_sitter::Parser,
    language: SupportedLanguage,
}

impl Parser {
    /// Creates a parser for `language`.
    ///
    /// # Errors
    ///
    /// Returns an error if Tree-sitter rejects the grammar, which happens
    /// when the grammar was built against an incompatible ABI.
    pub fn new(language: SupportedLanguage) -> Result<Self, SyntaxError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&language.tree_sitter_language())
            .map_err(|e| SyntaxError::parser_init(language, e.to_string()))?;

        Ok(Self { inner, language })
    }

    /// Returns the configured language.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Parses `source`.
    ///
    /// # Errors
    ///
    /// Returns an error only if Tree-sitter produces no tree at all; source
    /// with syntax errors still yields a [`ParseResult`].
    pub fn parse(&mut self, source: &str) -> Result<ParseResult, SyntaxError> {
        let tree = self
            .inner
            .parse(source, None)
            .ok_or_else(|| SyntaxError::parse(self.language, "parsing failed"))?;

        Ok(ParseResult {
            tree,
            source: source.to_owned(),
            language: self.language,
        })
    }
}

fn collect_error_nodes(root: tree_sitter::Node<'_>, source: &str) -> Vec<SyntaxErrorInfo> {
    let mut errors = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            errors.push(SyntaxErrorInfo::from_node(node, source));
        }
        if node.has_error() {
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }
    errors
}

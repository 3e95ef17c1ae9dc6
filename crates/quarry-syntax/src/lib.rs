//! Tree-sitter backed syntax trees for the quarry analysis toolchain.
//!
//! This crate is the boundary between source text and the pattern engine.
//! It wraps Tree-sitter parsing and converts the resulting concrete tree into
//! a small, owned, language-neutral model:
//!
//! - [`SyntaxNode`] - a type tag, an ordered list of child [`Slot`]s, and a
//!   [`Span`]
//! - [`Slot`] - a nested node, a terminal [`Value`], or an empty position
//! - [`Value`] - the literal held by a terminal slot
//!
//! The node vocabulary is open: a node's kind is whatever the grammar names
//! it, so patterns can target kinds this crate has never heard of.
//!
//! # Supported Languages
//!
//! - Rust (`.rs`)
//! - Python (`.py`, `.pyi`)
//! - TypeScript (`.ts`, `.tsx`, `.mts`, `.cts`)
//!
//! # Example
//!
//! ```
//! use quarry_syntax::{Parser, SupportedLanguage};
//!
//! let mut parser = Parser::new(SupportedLanguage::Python)?;
//! let parsed = parser.parse("debug_print(x)\n")?;
//! let root = parsed.to_syntax_tree();
//!
//! assert_eq!(root.kind(), "module");
//! assert!(root.descendants().any(|node| node.kind() == "call"));
//! # Ok::<(), quarry_syntax::SyntaxError>(())
//! ```

mod convert;
mod error;
mod language;
mod parser;
mod span;
mod tree;

pub use error::SyntaxError;
pub use language::{LanguageParseError, SupportedLanguage};
pub use parser::{ParseResult, Parser, SyntaxErrorInfo};
pub use span::{LineCol, Span};
pub use tree::{Descendants, Slot, SyntaxNode, Value};

#[cfg(test)]
mod tests;

//! Structural pattern compiler and matcher for quarry rules.
//!
//! Rules describe the code they look for with a small pattern language.
//! [`compile`] turns pattern text into a [`PatternAst`], an immutable tree
//! of matching operators, and [`PatternAst::matches`] tests it against a
//! [`quarry_syntax::SyntaxNode`] or one of its child slots.
//!
//! # Pattern Syntax
//!
//! | Form | Meaning |
//! |------|---------|
//! | `call` | a node whose kind is `call` |
//! | `call(a, b)` | a `call` node with exactly two children matching `a` and `b` |
//! | `call(a, ...)` | a `call` node whose first child matches `a`; more may follow |
//! | `_` | anything, including an empty slot |
//! | `_(a, b)` | a node of any kind whose children match `a` and `b` |
//! | `"text"`, `42`, `2.5`, `true`, `nil` | a terminal slot holding that value |
//! | `{a \| b}` | either `a` or `b` |
//! | `!a` | anything `a` does not match |
//! | `^a` | `a` matches the subject or anything beneath it |
//!
//! Node kinds form an open vocabulary: an unknown kind compiles and simply
//! never matches.
//!
//! # Example
//!
//! ```
//! use quarry_pattern::compile;
//!
//! let pattern = compile(r#"call(identifier("debug_print"), ...)"#)?;
//! assert_eq!(pattern.to_string(), r#"call(identifier("debug_print"), ...)"#);
//! # Ok::<(), quarry_pattern::PatternSyntaxError>(())
//! ```

mod ast;
mod compiler;
mod error;
mod lexer;
mod matcher;

pub use ast::{Arity, ChildList, PatternAst};
pub use compiler::{Pattern, compile};
pub use error::{PatternErrorKind, PatternSyntaxError};
pub use matcher::Subject;

#[cfg(test)]
mod tests;

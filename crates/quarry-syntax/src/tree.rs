//! The language-neutral syntax tree consumed by the pattern engine.
//!
//! Every node has the same shape: a kind tag, an ordered list of child
//! slots, and a span. There is no per-kind node type; patterns dispatch on
//! the tag instead.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::span::Span;

/// A literal held by a terminal slot.
///
/// Equality is by variant and value: `Integer(2)` and `Float(2.0)` are
/// different values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// A signed integer literal.
    Integer(i64),
    /// A floating-point literal.
    Float(f64),
    /// A boolean literal.
    Boolean(bool),
    /// Any textual token: identifiers, operators, string contents.
    String(String),
    /// The language's null value (`None`, `null`, `nil`).
    Nil,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value:?}"),
            Self::Nil => f.write_str("nil"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

/// One child position of a [`SyntaxNode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// A nested node.
    Node(SyntaxNode),
    /// A terminal literal.
    Terminal(Value),
    /// An absent optional child.
    Empty,
}

impl Slot {
    /// Returns the nested node, if this slot holds one.
    #[must_use]
    pub const fn as_node(&self) -> Option<&SyntaxNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Terminal(_) | Self::Empty => None,
        }
    }

    /// Returns the terminal value, if this slot holds one.
    #[must_use]
    pub const fn as_terminal(&self) -> Option<&Value> {
        match self {
            Self::Terminal(value) => Some(value),
            Self::Node(_) | Self::Empty => None,
        }
    }

    /// Returns `true` for an empty slot.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<SyntaxNode> for Slot {
    fn from(node: SyntaxNode) -> Self {
        Self::Node(node)
    }
}

impl From<Value> for Slot {
    fn from(value: Value) -> Self {
        Self::Terminal(value)
    }
}

/// A node in a parsed syntax tree.
///
/// Nodes are immutable once built and own their children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxNode {
    kind: String,
    children: Vec<Slot>,
    span: Span,
}

impl SyntaxNode {
    /// Creates a node from its kind, child slots, and span.
    #[must_use]
    pub fn new(kind: impl Into<String>, children: Vec<Slot>, span: Span) -> Self {
        Self {
            kind: kind.into(),
            children,
            span,
        }
    }

    /// Creates a node holding a single terminal value, the shape given to
    /// tokens such as identifiers and numeric literals.
    #[must_use]
    pub fn leaf(kind: impl Into<String>, value: Value, span: Span) -> Self {
        Self::new(kind, vec![Slot::Terminal(value)], span)
    }

    /// Returns the node's type tag.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the ordered child slots.
    #[must_use]
    pub fn children(&self) -> &[Slot] {
        &self.children
    }

    /// Returns the node's source span.
    #[must_use]
    pub const fn span(&self) -> &Span {
        &self.span
    }

    /// Iterates over the child slots that hold nodes, in order.
    pub fn child_nodes(&self) -> impl DoubleEndedIterator<Item = &Self> {
        self.children.iter().filter_map(Slot::as_node)
    }

    /// Returns a pre-order iterator over this node and every nested node.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Counts this node and every nested node.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.descendants().count()
    }
}

// Dropping a deep tree through the compiler's field-by-field glue would
// recurse once per level.
impl Drop for SyntaxNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(slot) = pending.pop() {
            if let Slot::Node(mut node) = slot {
                pending.append(&mut node.children);
            }
        }
    }
}

/// Pre-order, depth-first iterator over a tree's nodes.
///
/// Terminal and empty slots are skipped. Children are visited in declared
/// order.
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.child_nodes().rev());
        Some(node)
    }
}

//! The compiled form of a pattern.

use std::fmt;

use quarry_syntax::Value;

/// Whether a child list pins the node's arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// The node must have exactly as many children as the list.
    Exact,
    /// The list is a prefix; trailing children are unconstrained.
    Open,
}

/// An ordered list of child patterns checked positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildList {
    /// Patterns for the leading child slots, in order.
    pub items: Vec<PatternAst>,
    /// Whether extra trailing children are allowed.
    pub arity: Arity,
}

impl ChildList {
    /// Creates a child list.
    #[must_use]
    pub const fn new(items: Vec<PatternAst>, arity: Arity) -> Self {
        Self { items, arity }
    }
}

/// A tree of matching operators.
///
/// Values are immutable and side-effect free, so one compiled pattern can be
/// shared by every traversal in a run.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternAst {
    /// Matches a node whose kind equals the tag.
    TypeMatch(String),
    /// Matches any node, terminal, or empty slot.
    Wildcard,
    /// Matches a terminal slot holding an equal value.
    Literal(Value),
    /// Matches a node of any kind by its children.
    Children(ChildList),
    /// Matches a node by kind first, then by children.
    Node {
        /// Required node kind.
        kind: String,
        /// Required child shape.
        children: ChildList,
    },
    /// Matches when any member matches; members are tried in order.
    Alternation(Vec<PatternAst>),
    /// Matches exactly when the inner pattern does not.
    Negation(Box<PatternAst>),
    /// Matches when the inner pattern matches the subject or any slot
    /// beneath it.
    Anywhere(Box<PatternAst>),
}

impl PatternAst {
    /// Builds a [`PatternAst::TypeMatch`].
    #[must_use]
    pub fn type_match(kind: impl Into<String>) -> Self {
        Self::TypeMatch(kind.into())
    }

    /// Builds a [`PatternAst::Literal`].
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Builds a [`PatternAst::Children`].
    #[must_use]
    pub const fn children(items: Vec<Self>, arity: Arity) -> Self {
        Self::Children(ChildList::new(items, arity))
    }

    /// Builds a [`PatternAst::Node`].
    #[must_use]
    pub fn node(kind: impl Into<String>, items: Vec<Self>, arity: Arity) -> Self {
        Self::Node {
            kind: kind.into(),
            children: ChildList::new(items, arity),
        }
    }

    /// Builds a [`PatternAst::Negation`].
    #[must_use]
    pub fn negation(inner: Self) -> Self {
        Self::Negation(Box::new(inner))
    }

    /// Builds a [`PatternAst::Anywhere`].
    #[must_use]
    pub fn anywhere(inner: Self) -> Self {
        Self::Anywhere(Box::new(inner))
    }
}

impl fmt::Display for ChildList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (idx, item) in self.items.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        if self.arity == Arity::Open {
            if !self.items.is_empty() {
                f.write_str(", ")?;
            }
            f.write_str("...")?;
        }
        f.write_str(")")
    }
}

/// Renders the canonical pattern text; compiling it yields an equal tree.
impl fmt::Display for PatternAst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMatch(kind) => f.write_str(kind),
            Self::Wildcard => f.write_str("_"),
            Self::Literal(value) => write!(f, "{value}"),
            Self::Children(children) => write!(f, "_{children}"),
            Self::Node { kind, children } => write!(f, "{kind}{children}"),
            Self::Alternation(members) => {
                f.write_str("{")?;
                for (idx, member) in members.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str("}")
            }
            Self::Negation(inner) => write!(f, "!{inner}"),
            Self::Anywhere(inner) => write!(f, "^{inner}"),
        }
    }
}

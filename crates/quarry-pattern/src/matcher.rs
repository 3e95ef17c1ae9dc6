//! Evaluation of compiled patterns against syntax trees.

use quarry_syntax::{Slot, SyntaxNode, Value};

use crate::ast::{Arity, ChildList, PatternAst};

/// What a pattern is tested against: a node or one child slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Subject<'a> {
    /// A syntax node.
    Node(&'a SyntaxNode),
    /// A terminal slot holding a literal value.
    Terminal(&'a Value),
    /// An absent optional child.
    Empty,
}

impl<'a> From<&'a SyntaxNode> for Subject<'a> {
    fn from(node: &'a SyntaxNode) -> Self {
        Self::Node(node)
    }
}

impl<'a> From<&'a Slot> for Subject<'a> {
    fn from(slot: &'a Slot) -> Self {
        match slot {
            Slot::Node(node) => Self::Node(node),
            Slot::Terminal(value) => Self::Terminal(value),
            Slot::Empty => Self::Empty,
        }
    }
}

impl PatternAst {
    /// Returns whether this pattern matches `subject`.
    ///
    /// Total over every pattern and subject: arity mismatches, wrong kinds,
    /// and empty slots all evaluate to `false` rather than failing.
    #[must_use]
    pub fn matches<'a>(&self, subject: impl Into<Subject<'a>>) -> bool {
        self.matches_subject(subject.into())
    }

    fn matches_subject(&self, subject: Subject<'_>) -> bool {
        match (self, subject) {
            (Self::Wildcard, _) => true,
            (Self::Negation(inner), _) => !inner.matches_subject(subject),
            (Self::Anywhere(inner), _) => anywhere(inner, subject),
            (Self::Alternation(members), _) => {
                members.iter().any(|member| member.matches_subject(subject))
            }
            (Self::TypeMatch(kind), Subject::Node(node)) => node.kind() == kind,
            (Self::Literal(expected), Subject::Terminal(value)) => value == expected,
            (Self::Children(children), Subject::Node(node)) => children.matches_node(node),
            (Self::Node { kind, children }, Subject::Node(node)) => {
                node.kind() == kind && children.matches_node(node)
            }
            _ => false,
        }
    }
}

impl ChildList {
    fn matches_node(&self, node: &SyntaxNode) -> bool {
        let slots = node.children();
        let arity_ok = match self.arity {
            Arity::Exact => slots.len() == self.items.len(),
            Arity::Open => slots.len() >= self.items.len(),
        };
        arity_ok
            && self
                .items
                .iter()
                .zip(slots)
                .all(|(item, slot)| item.matches_subject(Subject::from(slot)))
    }
}

/// Depth-first search of `subject` and every slot beneath it.
fn anywhere(inner: &PatternAst, subject: Subject<'_>) -> bool {
    let mut stack = vec![subject];
    while let Some(current) = stack.pop() {
        if inner.matches_subject(current) {
            return true;
        }
        if let Subject::Node(node) = current {
            stack.extend(
                node.children()
                    .iter()
                    .rev()
                    .filter(|slot| !slot.is_empty())
                    .map(Subject::from),
            );
        }
    }
    false
}

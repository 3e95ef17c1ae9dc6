//! Conversion from Tree-sitter's concrete tree to [`SyntaxNode`].
//!
//! Named nodes survive, and so do anonymous tokens that fill a grammar
//! field, such as the `operator` of a binary expression. Those tokens
//! become terminal string slots in their parent. A named node without
//! named children becomes a leaf holding its text as a terminal [`Value`].
//!
//! The walk keeps its own stack of open nodes, so nesting depth is bounded
//! by memory rather than by the thread's stack.

use std::vec;

use crate::span::Span;
use crate::tree::{Slot, SyntaxNode, Value};

/// A node whose children are still being converted.
struct Frame<'tree> {
    kind: &'static str,
    span: Span,
    children: Vec<Slot>,
    pending: vec::IntoIter<tree_sitter::Node<'tree>>,
}

enum Opened<'tree> {
    Leaf(SyntaxNode),
    Frame(Frame<'tree>),
}

impl<'tree> Frame<'tree> {
    fn open(node: tree_sitter::Node<'tree>, source: &str) -> Opened<'tree> {
        let span = Span::from_node(node);
        let kept = kept_children(node);
        if !kept.iter().any(tree_sitter::Node::is_named) {
            let value = classify_terminal(node.kind(), span.text(source));
            return Opened::Leaf(SyntaxNode::leaf(node.kind(), value, span));
        }
        Opened::Frame(Self {
            kind: node.kind(),
            span,
            children: Vec::with_capacity(kept.len()),
            pending: kept.into_iter(),
        })
    }

    fn finish(self) -> SyntaxNode {
        SyntaxNode::new(self.kind, self.children, self.span)
    }
}

pub(crate) fn to_syntax_node(root: tree_sitter::Node<'_>, source: &str) -> SyntaxNode {
    let mut current = match Frame::open(root, source) {
        Opened::Leaf(leaf) => return leaf,
        Opened::Frame(frame) => frame,
    };
    let mut ancestors: Vec<Frame<'_>> = Vec::new();

    loop {
        match current.pending.next() {
            Some(child) if child.is_named() => match Frame::open(child, source) {
                Opened::Leaf(leaf) => current.children.push(Slot::Node(leaf)),
                Opened::Frame(frame) => ancestors.push(std::mem::replace(&mut current, frame)),
            },
            Some(token) => current.children.push(Slot::Terminal(token_value(token, source))),
            None => {
                let node = current.finish();
                match ancestors.pop() {
                    Some(parent) => {
                        current = parent;
                        current.children.push(Slot::Node(node));
                    }
                    None => return node,
                }
            }
        }
    }
}

/// Named children plus anonymous tokens that carry a field name, in
/// source order.
fn kept_children(node: tree_sitter::Node<'_>) -> Vec<tree_sitter::Node<'_>> {
    let mut kept = Vec::new();
    let mut cursor = node.walk();
    if !cursor.goto_first_child() {
        return kept;
    }
    loop {
        let child = cursor.node();
        if child.is_named() || cursor.field_name().is_some() {
            kept.push(child);
        }
        if !cursor.goto_next_sibling() {
            return kept;
        }
    }
}

fn token_value(token: tree_sitter::Node<'_>, source: &str) -> Value {
    let text = source.get(token.byte_range()).unwrap_or_else(|| token.kind());
    Value::String(text.to_owned())
}

/// Picks the literal type for a token from its grammar kind and text.
pub(crate) fn classify_terminal(kind: &str, text: &str) -> Value {
    let kind_lower = kind.to_ascii_lowercase();

    if kind_lower.contains("integer") {
        if let Some(value) = parse_integer(text) {
            return Value::Integer(value);
        }
    }

    if kind_lower.contains("float") {
        if let Ok(value) = text.replace('_', "").parse::<f64>() {
            return Value::Float(value);
        }
    }

    if kind_lower.contains("bool") || matches!(kind_lower.as_str(), "true" | "false") {
        match text {
            "true" | "True" => return Value::Boolean(true),
            "false" | "False" => return Value::Boolean(false),
            _ => {}
        }
    }

    if matches!(kind_lower.as_str(), "nil" | "none" | "null") {
        return Value::Nil;
    }

    Value::String(text.to_owned())
}

const INTEGER_SUFFIXES: &[&str] = &[
    "i128", "u128", "isize", "usize", "i64", "u64", "i32", "u32", "i16", "u16", "i8", "u8",
];

fn parse_integer(text: &str) -> Option<i64> {
    let cleaned = text.replace('_', "");
    // Rust allows type suffixes such as `1u8`.
    let digits = INTEGER_SUFFIXES
        .iter()
        .find_map(|suffix| cleaned.strip_suffix(*suffix))
        .unwrap_or(cleaned.as_str());
    let (radix, body) = match digits.get(..2) {
        Some("0x" | "0X") => (16, digits.get(2..)?),
        Some("0o" | "0O") => (8, digits.get(2..)?),
        Some("0b" | "0B") => (2, digits.get(2..)?),
        _ => (10, digits),
    };
    i64::from_str_radix(body, radix).ok()
}

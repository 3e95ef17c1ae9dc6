//! Unit tests for tree conversion.

use rstest::{fixture, rstest};

use crate::{LineCol, Parser, Slot, Span, SupportedLanguage, SyntaxNode, Value};

#[fixture]
fn python() -> Parser {
    Parser::new(SupportedLanguage::Python).expect("parser init")
}

fn count_named(node: tree_sitter::Node<'_>) -> usize {
    let mut cursor = node.walk();
    let children: usize = node.named_children(&mut cursor).map(count_named).sum();
    children + 1
}

#[rstest]
fn conversion_keeps_every_named_node(mut python: Parser) {
    let parsed = python
        .parse("def f(a):\n    return g(a, 1) + h()\n")
        .expect("parse");
    let root = parsed.to_syntax_tree();

    assert_eq!(root.node_count(), count_named(parsed.tree().root_node()));
}

#[rstest]
fn identifiers_become_string_leaves(mut python: Parser) {
    let root = python.parse("debug_print(x)\n").expect("parse").to_syntax_tree();

    let call = root
        .descendants()
        .find(|node| node.kind() == "call")
        .expect("call node");
    let function = call.child_nodes().next().expect("function child");

    assert_eq!(function.kind(), "identifier");
    assert_eq!(
        function.children(),
        &[Slot::Terminal(Value::String("debug_print".to_owned()))]
    );
}

#[rstest]
#[case("x = 7\n", "integer", Value::Integer(7))]
#[case("x = 2.5\n", "float", Value::Float(2.5))]
#[case("x = True\n", "true", Value::Boolean(true))]
#[case("x = None\n", "none", Value::Nil)]
fn literals_are_typed(
    mut python: Parser,
    #[case] source: &str,
    #[case] kind: &str,
    #[case] expected: Value,
) {
    let root = python.parse(source).expect("parse").to_syntax_tree();
    let literal = root
        .descendants()
        .find(|node| node.kind() == kind)
        .expect("literal node");

    assert_eq!(literal.children().first().and_then(Slot::as_terminal), Some(&expected));
}

#[rstest]
fn spans_are_zero_based(mut python: Parser) {
    let root = python.parse("a = 1\nb = 2\n").expect("parse").to_syntax_tree();
    let second = root
        .descendants()
        .filter(|node| node.kind() == "assignment")
        .nth(1)
        .expect("second assignment");

    assert_eq!(second.span().start, LineCol::new(1, 0));
    assert_eq!(second.span().start_byte, 6);
}

#[test]
fn descendants_walk_in_pre_order_and_skip_non_node_slots() {
    let span = Span::default();
    let tree = SyntaxNode::new(
        "root",
        vec![
            Slot::Node(SyntaxNode::new(
                "a",
                vec![Slot::Node(SyntaxNode::leaf("a1", Value::Nil, span))],
                span,
            )),
            Slot::Empty,
            Slot::Terminal(Value::Integer(3)),
            Slot::Node(SyntaxNode::leaf("b", Value::Boolean(false), span)),
        ],
        span,
    );

    let kinds: Vec<_> = tree.descendants().map(SyntaxNode::kind).collect();
    assert_eq!(kinds, vec!["root", "a", "a1", "b"]);
    assert_eq!(tree.node_count(), 4);
}

#[test]
fn value_display_is_stable() {
    let rendered: Vec<_> = [
        Value::Integer(-3),
        Value::Float(1.0),
        Value::Boolean(true),
        Value::String("log".to_owned()),
        Value::Nil,
    ]
    .iter()
    .map(ToString::to_string)
    .collect();

    insta::assert_snapshot!(rendered.join(" "), @r#"-3 1.0 true "log" nil"#);
}

#[test]
fn syntax_tree_serialises_to_json() {
    let node = SyntaxNode::leaf("integer", Value::Integer(1), Span::default());
    let json = serde_json::to_value(&node).expect("serialise");

    assert_eq!(json["kind"], "integer");
    assert_eq!(json["children"][0]["terminal"]["type"], "integer");
    assert_eq!(json["children"][0]["terminal"]["value"], 1);
}

#[rstest]
#[case("x = a + b\n", "binary_operator", "+")]
#[case("x = a == b\n", "comparison_operator", "==")]
#[case("x = a and b\n", "boolean_operator", "and")]
fn field_tokens_become_terminals(
    mut python: Parser,
    #[case] source: &str,
    #[case] kind: &str,
    #[case] operator: &str,
) {
    let root = python.parse(source).expect("parse").to_syntax_tree();
    let expression = root
        .descendants()
        .find(|node| node.kind() == kind)
        .expect("operator node");

    let [Slot::Node(left), Slot::Terminal(token), Slot::Node(right)] = expression.children()
    else {
        panic!("expected operand, operator, operand: {expression:?}");
    };
    assert_eq!(left.kind(), "identifier");
    assert_eq!(token, &Value::String(operator.to_owned()));
    assert_eq!(right.kind(), "identifier");
}

#[rstest]
fn unlabelled_punctuation_is_dropped(mut python: Parser) {
    let root = python.parse("f(a, b)\n").expect("parse").to_syntax_tree();
    let arguments = root
        .descendants()
        .find(|node| node.kind() == "argument_list")
        .expect("argument list");

    assert!(arguments.children().iter().all(|slot| slot.as_node().is_some()));
    assert_eq!(arguments.child_nodes().count(), 2);
}

#[test]
fn deeply_nested_source_converts_and_drops() {
    const DEPTH: usize = 10_000;
    let source = format!(
        "fn main() {{ let x = {}1{}; }}\n",
        "(".repeat(DEPTH),
        ")".repeat(DEPTH)
    );
    let mut parser = Parser::new(SupportedLanguage::Rust).expect("parser init");
    let parsed = parser.parse(&source).expect("parse");
    assert!(!parsed.has_errors());
    assert!(parsed.errors().is_empty());

    let root = parsed.to_syntax_tree();
    let nested = root
        .descendants()
        .filter(|node| node.kind() == "parenthesized_expression")
        .count();
    assert_eq!(nested, DEPTH);
    drop(root);
}

#[test]
fn dropping_a_hand_built_chain_is_iterative() {
    let span = Span::default();
    let mut chain = SyntaxNode::leaf("leaf", Value::Nil, span);
    for _ in 0..200_000 {
        chain = SyntaxNode::new("wrap", vec![Slot::Node(chain)], span);
    }

    assert_eq!(chain.kind(), "wrap");
    drop(chain);
}

//! Tests for [`Analyzer`] traversal and event ordering.

use quarry_syntax::{LineCol, Slot, Span, SupportedLanguage, SyntaxNode, Value};
use rstest::{fixture, rstest};

use crate::{
    AnalysisEvent, Analyzer, PatternSource, RuleDefinition, RuleSet, Script, ScriptError,
    Severity,
};

fn rule(id: &str, patterns: &[&str]) -> RuleDefinition {
    RuleDefinition {
        id: id.to_owned(),
        pattern: PatternSource::Many(patterns.iter().map(|text| (*text).to_owned()).collect()),
        message: format!("{id} found"),
        severity: Severity::Warning,
        tags: Vec::new(),
        justification: Vec::new(),
        include: Vec::new(),
        exclude: Vec::new(),
    }
}

fn rule_set(definitions: &[RuleDefinition]) -> RuleSet {
    RuleSet::from_definitions(definitions).expect("rules compile")
}

fn python(path: &str, source: &str) -> Result<Script, ScriptError> {
    Script::parse(path, source)
}

fn at_line(line: u32) -> Span {
    Span::new(0, 0, LineCol::new(line, 0), LineCol::new(line, 0))
}

/// Two calls: `recv.debug_print(a, 2)` on line 0 and `log` with no receiver
/// on line 1.
#[fixture]
fn two_calls() -> Script {
    let leaf = |kind: &str, value: Value| Slot::Node(SyntaxNode::leaf(kind, value, at_line(0)));
    let debug_call = SyntaxNode::new(
        "call",
        vec![
            leaf("identifier", Value::from("recv")),
            Slot::Terminal(Value::from("debug_print")),
            leaf("identifier", Value::from("a")),
            leaf("integer", Value::Integer(2)),
        ],
        at_line(0),
    );
    let log_call = SyntaxNode::new(
        "call",
        vec![Slot::Empty, Slot::Terminal(Value::from("log"))],
        at_line(1),
    );
    let root = SyntaxNode::new(
        "program",
        vec![debug_call.into(), log_call.into()],
        at_line(0),
    );
    Script::new("app.rb", SupportedLanguage::Python, "", root)
}

fn issue_lines(analyzer: &Analyzer) -> Vec<(String, u32)> {
    analyzer
        .run()
        .map(|issue| {
            (
                issue.rule().id().to_owned(),
                issue.node().span().start.one_based().0,
            )
        })
        .collect()
}

#[rstest]
fn debug_print_rule_reports_only_the_matching_call(two_calls: Script) {
    let mut analyzer = Analyzer::new(
        rule_set(&[rule("no-debug-print", &[r#"call(_, "debug_print", ...)"#])]),
        ".",
    );
    analyzer.register("app.rb", Ok(two_calls));

    let issues: Vec<_> = analyzer.run().collect();
    let [issue] = issues.as_slice() else {
        panic!("expected exactly one issue, got {}", issues.len());
    };
    assert_eq!(issue.rule().id(), "no-debug-print");
    assert_eq!(issue.node().span().start.line, 0);
    assert_eq!(issue.pair.pattern.source(), r#"call(_, "debug_print", ...)"#);
}

#[test]
fn every_node_is_visited_exactly_once() {
    let source = "def f(a, b=None):\n    return g(a)[0] + h(b, *a)\n\nclass C:\n    x = 1.5\n";
    let script = python("app.py", source).expect("parse");
    let expected = script.root().node_count();

    let mut analyzer = Analyzer::new(rule_set(&[rule("all", &["_"])]), ".");
    analyzer.register("app.py", Ok(script));

    assert_eq!(analyzer.run().count(), expected);
}

#[test]
fn one_issue_per_rule_per_node_in_rule_order() {
    let mut analyzer = Analyzer::new(
        rule_set(&[
            rule("any-call", &["call", "_(identifier, ...)"]),
            rule("named", &["_(identifier, ...)"]),
        ]),
        ".",
    );
    analyzer.register("app.py", python("app.py", "f()\n"));

    let ids: Vec<_> = issue_lines(&analyzer).into_iter().map(|(id, _)| id).collect();
    assert_eq!(ids, ["any-call", "named"]);
}

#[test]
fn first_matching_alternative_is_reported() {
    let mut analyzer = Analyzer::new(rule_set(&[rule("calls", &["method_call", "call"])]), ".");
    analyzer.register("app.py", python("app.py", "f()\n"));

    let patterns: Vec<_> = analyzer
        .run()
        .map(|issue| issue.pair.pattern.source().to_owned())
        .collect();
    assert_eq!(patterns, ["call"]);
}

#[test]
fn events_are_reproducible() {
    let mut analyzer = Analyzer::new(
        rule_set(&[rule("calls", &["call"]), rule("names", &["identifier"])]),
        ".",
    );
    analyzer.register("b.py", python("b.py", "x = f(y)\n"));
    analyzer.register("a.py", python("a.py", "g(h(1))\n"));

    let render = |analyzer: &Analyzer| {
        analyzer
            .events()
            .map(|event| event.to_string())
            .collect::<Vec<_>>()
    };
    let first = render(&analyzer);
    assert_eq!(first, render(&analyzer));
    assert!(first.first().is_some_and(|line| line == "loaded b.py"));
}

#[test]
fn failed_scripts_are_isolated() {
    let mut analyzer = Analyzer::new(rule_set(&[rule("calls", &["call"])]), ".");
    let failed = analyzer.register("broken.py", python("broken.py", "def (:\n"));
    assert!(matches!(failed, AnalysisEvent::ScriptFailed { path, .. } if path == "broken.py"));
    let loaded = analyzer.register("ok.py", python("ok.py", "f()\n"));
    assert!(matches!(loaded, AnalysisEvent::ScriptLoaded(script) if script.path() == "ok.py"));

    let events: Vec<_> = analyzer.events().collect();
    let failures = events
        .iter()
        .filter(|event| matches!(event, AnalysisEvent::ScriptFailed { .. }))
        .count();
    let issue_paths: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            AnalysisEvent::IssueFound(issue) => Some(issue.script.path().as_str()),
            _ => None,
        })
        .collect();

    assert_eq!(failures, 1);
    assert_eq!(issue_paths, ["ok.py"]);
    assert_eq!(analyzer.scripts().count(), 1);
}

#[test]
fn path_filters_decide_which_scripts_a_rule_sees() {
    let mut tests_only = rule("tests-only", &["call"]);
    tests_only.include = vec!["tests/**".to_owned()];
    let mut not_vendor = rule("not-vendor", &["call"]);
    not_vendor.exclude = vec!["vendor/**".to_owned()];

    let mut analyzer = Analyzer::new(rule_set(&[tests_only, not_vendor]), "/repo");
    for path in ["/repo/tests/t.py", "/repo/vendor/v.py", "/repo/src/s.py"] {
        analyzer.register(path, python(path, "f()\n"));
    }

    let seen: Vec<_> = analyzer
        .run()
        .map(|issue| format!("{} {}", issue.script.path(), issue.rule().id()))
        .collect();
    assert_eq!(
        seen,
        [
            "/repo/tests/t.py tests-only",
            "/repo/tests/t.py not-vendor",
            "/repo/src/s.py not-vendor",
        ]
    );
}

#[test]
fn anywhere_patterns_are_not_deduplicated() {
    let mut analyzer = Analyzer::new(rule_set(&[rule("has-x", &["^identifier('x')"])]), ".");
    analyzer.register("app.py", python("app.py", "f(x)\n"));

    let kinds: Vec<_> = analyzer.run().map(|issue| issue.node().kind().to_owned()).collect();
    assert_eq!(
        kinds,
        ["module", "expression_statement", "call", "argument_list", "identifier"]
    );
}

#[test]
fn dropping_the_stream_early_is_allowed() {
    let mut analyzer = Analyzer::new(rule_set(&[rule("all", &["_"])]), ".");
    analyzer.register("app.py", python("app.py", "a = [1, 2, 3]\n"));

    let mut issues = analyzer.run();
    let first = issues.next().expect("first issue");
    assert_eq!(first.node().kind(), "module");
    drop(issues);

    assert!(analyzer.run().count() > 1);
}

#[test]
fn event_stream_snapshot() {
    let mut analyzer = Analyzer::new(
        rule_set(&[rule("no-debug-print", &["call(identifier('debug_print'), ...)"])]),
        ".",
    );
    analyzer.register("app.py", python("app.py", "log(x)\ndebug_print(1)\n"));
    analyzer.register(
        "notes.txt",
        Err(ScriptError::unsupported_language("notes.txt")),
    );

    let rendered: Vec<_> = analyzer.events().map(|event| event.to_string()).collect();
    insta::assert_snapshot!(rendered.join("\n"), @r#"
    loaded app.py
    failed notes.txt: no supported language for notes.txt
    issue app.py:2:1 no-debug-print [call] `call(identifier('debug_print'), ...)`
    "#);
}

#[test]
fn operator_tokens_tell_expressions_apart() {
    let mut analyzer = Analyzer::new(
        rule_set(&[
            rule("plus", &["binary_operator(_, \"+\", _)"]),
            rule("equals", &["comparison_operator(_, '==', _)"]),
        ]),
        ".",
    );
    analyzer.register("ops.py", python("ops.py", "x = a + b\ny = a - b\nz = a == b\n"));

    let seen: Vec<_> = analyzer
        .run()
        .map(|issue| (issue.rule().id().to_owned(), issue.node().span().start))
        .collect();
    assert_eq!(
        seen,
        [
            ("plus".to_owned(), LineCol::new(0, 4)),
            ("equals".to_owned(), LineCol::new(2, 4)),
        ]
    );
}

#[test]
fn loaded_scripts_keep_their_own_path() {
    let mut analyzer = Analyzer::new(rule_set(&[rule("calls", &["call"])]), ".");

    let event = analyzer.register("other.py", python("app.py", "f()\n"));
    let AnalysisEvent::ScriptLoaded(script) = event else {
        panic!("expected a loaded script, got {event}");
    };
    assert_eq!(script.path(), "app.py");

    let failure = analyzer.register("named.py", Err(ScriptError::unsupported_language("x.txt")));
    let AnalysisEvent::ScriptFailed { path, .. } = failure else {
        panic!("expected a failure, got {failure}");
    };
    assert_eq!(path, "named.py");
}

//! The ordered events an analysis run produces.

use std::fmt;

use camino::Utf8Path;
use quarry_pattern::Pattern;
use quarry_syntax::SyntaxNode;

use crate::error::ScriptError;
use crate::rule::Rule;
use crate::script::Script;

/// The rule, alternative, and node behind one finding.
#[derive(Debug, Clone, Copy)]
pub struct MatchPair<'a> {
    /// The rule that fired.
    pub rule: &'a Rule,
    /// The first of the rule's patterns that matched.
    pub pattern: &'a Pattern,
    /// The matched node.
    pub node: &'a SyntaxNode,
}

/// One finding: a rule matching a node of a script.
#[derive(Debug, Clone, Copy)]
pub struct Issue<'a> {
    /// The script containing the node.
    pub script: &'a Script,
    /// What matched.
    pub pair: MatchPair<'a>,
}

impl<'a> Issue<'a> {
    /// Returns the rule that fired.
    #[must_use]
    pub const fn rule(&self) -> &'a Rule {
        self.pair.rule
    }

    /// Returns the matched node.
    #[must_use]
    pub const fn node(&self) -> &'a SyntaxNode {
        self.pair.node
    }

    /// Returns the full text of the first line of the match.
    #[must_use]
    pub fn source_line(&self) -> &'a str {
        self.pair.node.span().first_line(self.script.source())
    }

    /// Returns the matched source text.
    #[must_use]
    pub fn source_text(&self) -> &'a str {
        self.pair.node.span().text(self.script.source())
    }
}

/// Everything an analysis run reports, in run order.
#[derive(Debug, Clone, Copy)]
pub enum AnalysisEvent<'a> {
    /// A script parsed and will be analysed.
    ScriptLoaded(&'a Script),
    /// A script could not be loaded and is skipped.
    ScriptFailed {
        /// The failing path.
        path: &'a Utf8Path,
        /// Why it failed.
        error: &'a ScriptError,
    },
    /// A rule matched a node.
    IssueFound(Issue<'a>),
}

/// Renders a compact one-line description used in logs and golden tests.
impl fmt::Display for AnalysisEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScriptLoaded(script) => write!(f, "loaded {}", script.path()),
            Self::ScriptFailed { path, error } => write!(f, "failed {path}: {error}"),
            Self::IssueFound(issue) => {
                let (line, column) = issue.node().span().start.one_based();
                write!(
                    f,
                    "issue {}:{line}:{column} {} [{}] `{}`",
                    issue.script.path(),
                    issue.rule().id(),
                    issue.node().kind(),
                    issue.pair.pattern.source(),
                )
            }
        }
    }
}

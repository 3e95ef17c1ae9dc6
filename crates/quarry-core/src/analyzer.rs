//! The analysis driver.

use std::iter::Chain;
use std::{option, slice};

use camino::{Utf8Path, Utf8PathBuf};
use quarry_syntax::SyntaxNode;
use tracing::{debug, warn};

use crate::error::ScriptError;
use crate::event::{AnalysisEvent, Issue, MatchPair};
use crate::paths::ProjectRoot;
use crate::rule::{Rule, RuleSet};
use crate::script::Script;

const ANALYZER_TARGET: &str = "quarry::analyzer";

enum Entry {
    Loaded(Script),
    Failed { path: Utf8PathBuf, error: ScriptError },
}

impl Entry {
    fn event(&self) -> AnalysisEvent<'_> {
        match self {
            Self::Loaded(script) => AnalysisEvent::ScriptLoaded(script),
            Self::Failed { path, error } => AnalysisEvent::ScriptFailed { path, error },
        }
    }
}

/// Runs a fixed rule set over an append-only collection of scripts.
///
/// Scripts are registered in arrival order. [`Analyzer::run`] then walks
/// every loaded script and yields issues lazily, in registration order,
/// then pre-order tree order, then rule order.
pub struct Analyzer {
    rules: RuleSet,
    root: ProjectRoot,
    earlier: Vec<Entry>,
    latest: Option<Entry>,
}

impl Analyzer {
    /// Creates an analyzer whose rule path filters are matched against
    /// script paths relative to `root`.
    #[must_use]
    pub fn new(rules: RuleSet, root: impl AsRef<Utf8Path>) -> Self {
        Self {
            rules,
            root: ProjectRoot::new(root.as_ref()),
            earlier: Vec::new(),
            latest: None,
        }
    }

    /// Returns the rule set.
    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Records a load outcome and returns its event.
    ///
    /// `path` is kept only for failures. A loaded script is reported under
    /// its own [`Script::path`]. Failed scripts are reported here once and
    /// never analysed.
    pub fn register(
        &mut self,
        path: impl Into<Utf8PathBuf>,
        outcome: Result<Script, ScriptError>,
    ) -> AnalysisEvent<'_> {
        let entry = match outcome {
            Ok(script) => Entry::Loaded(script),
            Err(error) => {
                let failed_path = path.into();
                warn!(
                    target: ANALYZER_TARGET,
                    path = %failed_path,
                    error = %error,
                    "script failed to load"
                );
                Entry::Failed {
                    path: failed_path,
                    error,
                }
            }
        };
        if let Some(previous) = self.latest.take() {
            self.earlier.push(previous);
        }
        self.latest.insert(entry).event()
    }

    fn entries(&self) -> EntryIter<'_> {
        self.earlier.iter().chain(self.latest.iter())
    }

    /// Returns the loaded scripts in registration order.
    pub fn scripts(&self) -> impl Iterator<Item = &Script> {
        self.entries().filter_map(|entry| match entry {
            Entry::Loaded(script) => Some(script),
            Entry::Failed { .. } => None,
        })
    }

    /// Starts a traversal over every loaded script.
    ///
    /// The returned iterator does the matching as it is pulled; dropping it
    /// early stops the run. Calling `run` again repeats the traversal.
    #[must_use]
    pub fn run(&self) -> Issues<'_> {
        Issues {
            rules: &self.rules,
            root: &self.root,
            entries: self.entries(),
            current: None,
        }
    }

    /// Returns the complete event sequence: every load event in
    /// registration order, followed by every issue.
    pub fn events(&self) -> impl Iterator<Item = AnalysisEvent<'_>> {
        self.entries()
            .map(Entry::event)
            .chain(self.run().map(AnalysisEvent::IssueFound))
    }
}

type EntryIter<'a> = Chain<slice::Iter<'a, Entry>, option::Iter<'a, Entry>>;

/// Lazy stream of issues produced by [`Analyzer::run`].
///
/// Holds only borrowed cursors into the analyzer, so dropping it at any
/// point releases nothing but its own work stack.
pub struct Issues<'a> {
    rules: &'a RuleSet,
    root: &'a ProjectRoot,
    entries: EntryIter<'a>,
    current: Option<ScriptWalk<'a>>,
}

impl<'a> Iterator for Issues<'a> {
    type Item = Issue<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(walk) = self.current.as_mut() {
                if let Some(issue) = walk.next_issue() {
                    return Some(issue);
                }
                debug!(
                    target: ANALYZER_TARGET,
                    path = %walk.script.path(),
                    nodes = walk.visited,
                    "finished script"
                );
                self.current = None;
            }
            match self.entries.next()? {
                Entry::Loaded(script) => {
                    self.current = Some(ScriptWalk::new(script, self.rules, self.root));
                }
                Entry::Failed { .. } => {}
            }
        }
    }
}

/// Pre-order walk of one script, testing each node against the rules that
/// admit the script.
struct ScriptWalk<'a> {
    script: &'a Script,
    admitted: Vec<&'a Rule>,
    stack: Vec<&'a SyntaxNode>,
    node: Option<&'a SyntaxNode>,
    next_rule: usize,
    visited: usize,
}

impl<'a> ScriptWalk<'a> {
    fn new(script: &'a Script, rules: &'a RuleSet, root: &ProjectRoot) -> Self {
        let relative = root.relative(script.path());
        let admitted: Vec<&Rule> = rules.iter().filter(|rule| rule.admits(&relative)).collect();
        debug!(
            target: ANALYZER_TARGET,
            path = %script.path(),
            rules = admitted.len(),
            "walking script"
        );
        Self {
            script,
            admitted,
            stack: vec![script.root()],
            node: None,
            next_rule: 0,
            visited: 0,
        }
    }

    fn next_issue(&mut self) -> Option<Issue<'a>> {
        loop {
            if let Some(node) = self.node {
                if let Some(issue) = self.test_remaining_rules(node) {
                    return Some(issue);
                }
                self.stack.extend(node.child_nodes().rev());
                self.node = None;
            }
            self.node = Some(self.stack.pop()?);
            self.next_rule = 0;
            self.visited += 1;
        }
    }

    fn test_remaining_rules(&mut self, node: &'a SyntaxNode) -> Option<Issue<'a>> {
        while let Some(rule) = self.admitted.get(self.next_rule).copied() {
            self.next_rule += 1;
            if let Some(pattern) = rule.first_match(node) {
                return Some(Issue {
                    script: self.script,
                    pair: MatchPair {
                        rule,
                        pattern,
                        node,
                    },
                });
            }
        }
        None
    }
}

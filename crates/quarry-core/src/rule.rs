//! Compiled rules and rule sets.

use std::collections::HashSet;

use camino::Utf8Path;
use globset::{Glob, GlobSet, GlobSetBuilder};
use quarry_pattern::Pattern;
use quarry_syntax::SyntaxNode;
use tracing::info;

use crate::config::{RuleDefinition, RuleFile, Severity};
use crate::error::RuleError;

const RULES_TARGET: &str = "quarry::rules";

/// Include and exclude globs over script paths.
///
/// A path is admitted when it matches at least one include glob (or no
/// include globs are declared) and matches no exclude glob.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl PathFilter {
    /// Compiles the include and exclude globs for `owner`, which names the
    /// rule in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidGlob`] for the first malformed glob.
    pub fn new(owner: &str, include: &[String], exclude: &[String]) -> Result<Self, RuleError> {
        Ok(Self {
            include: build_glob_set(owner, include)?,
            exclude: build_glob_set(owner, exclude)?,
        })
    }

    /// Checks each glob on its own, returning one error per malformed glob
    /// in declared order.
    #[must_use]
    pub fn validate(owner: &str, include: &[String], exclude: &[String]) -> Vec<RuleError> {
        include
            .iter()
            .chain(exclude)
            .filter_map(|text| {
                Glob::new(text)
                    .err()
                    .map(|err| RuleError::invalid_glob(owner, text, err.kind().to_string()))
            })
            .collect()
    }

    /// Returns whether `path` passes the filter.
    #[must_use]
    pub fn admits(&self, path: &Utf8Path) -> bool {
        let included = self
            .include
            .as_ref()
            .is_none_or(|globs| globs.is_match(path.as_std_path()));
        let excluded = self
            .exclude
            .as_ref()
            .is_some_and(|globs| globs.is_match(path.as_std_path()));
        included && !excluded
    }
}

fn build_glob_set(owner: &str, globs: &[String]) -> Result<Option<GlobSet>, RuleError> {
    if globs.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for text in globs {
        let glob =
            Glob::new(text).map_err(|err| RuleError::invalid_glob(owner, text, err.kind().to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map(Some)
        .map_err(|err| RuleError::invalid_glob(owner, globs.join(", "), err.to_string()))
}

/// A named check: one or more pattern alternatives plus reporting metadata.
#[derive(Debug, Clone)]
pub struct Rule {
    id: String,
    patterns: Vec<Pattern>,
    message: String,
    severity: Severity,
    tags: Vec<String>,
    justification: Vec<String>,
    include: Vec<String>,
    exclude: Vec<String>,
    filter: PathFilter,
}

impl Rule {
    /// Compiles a rule definition.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::NoPatterns`] when the definition lists no
    /// pattern, [`RuleError::PatternSyntax`] for the first pattern that
    /// fails to compile, and [`RuleError::InvalidGlob`] for a malformed
    /// path filter.
    pub fn from_definition(definition: &RuleDefinition) -> Result<Self, RuleError> {
        let texts = definition.pattern.texts();
        if texts.is_empty() {
            return Err(RuleError::NoPatterns {
                rule_id: definition.id.clone(),
            });
        }
        let patterns = texts
            .iter()
            .map(|text| {
                Pattern::compile(text).map_err(|err| RuleError::pattern_syntax(&definition.id, &err))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let filter = PathFilter::new(&definition.id, &definition.include, &definition.exclude)?;

        Ok(Self {
            id: definition.id.clone(),
            patterns,
            message: definition.message.clone(),
            severity: definition.severity,
            tags: definition.tags.clone(),
            justification: definition.justification.clone(),
            include: definition.include.clone(),
            exclude: definition.exclude.clone(),
            filter,
        })
    }

    /// Checks a definition without building it.
    ///
    /// Unlike [`Rule::from_definition`], every problem is returned: a
    /// missing pattern list, each pattern that fails to compile, and each
    /// malformed glob.
    #[must_use]
    pub fn validate(definition: &RuleDefinition) -> Vec<RuleError> {
        let texts = definition.pattern.texts();
        let mut problems = Vec::new();
        if texts.is_empty() {
            problems.push(RuleError::NoPatterns {
                rule_id: definition.id.clone(),
            });
        }
        problems.extend(texts.iter().filter_map(|text| {
            Pattern::compile(text)
                .err()
                .map(|err| RuleError::pattern_syntax(&definition.id, &err))
        }));
        problems.extend(PathFilter::validate(
            &definition.id,
            &definition.include,
            &definition.exclude,
        ));
        problems
    }

    /// Returns the rule identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the pattern alternatives in declared order.
    #[must_use]
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Returns the finding message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the finding severity.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the rule's tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns the documented justifications.
    #[must_use]
    pub fn justification(&self) -> &[String] {
        &self.justification
    }

    /// Returns the include globs as written.
    #[must_use]
    pub fn include(&self) -> &[String] {
        &self.include
    }

    /// Returns the exclude globs as written.
    #[must_use]
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Returns whether the rule applies to a script at `path`.
    #[must_use]
    pub fn admits(&self, path: &Utf8Path) -> bool {
        self.filter.admits(path)
    }

    /// Returns the first pattern alternative that matches `node`.
    #[must_use]
    pub fn first_match(&self, node: &SyntaxNode) -> Option<&Pattern> {
        self.patterns.iter().find(|pattern| pattern.matches(node))
    }
}

/// Rules in configuration order.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Compiles every definition in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`RuleError`]; no partial rule set is built.
    pub fn from_definitions(definitions: &[RuleDefinition]) -> Result<Self, RuleError> {
        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(definitions.len());
        for definition in definitions {
            if !seen.insert(definition.id.as_str()) {
                return Err(RuleError::DuplicateId {
                    rule_id: definition.id.clone(),
                });
            }
            rules.push(Rule::from_definition(definition)?);
        }
        info!(
            target: RULES_TARGET,
            rules = rules.len(),
            "compiled rule set"
        );
        Ok(Self { rules })
    }

    /// Checks every definition and collects all problems, in definition
    /// order. Duplicate ids are reported at each repeat.
    #[must_use]
    pub fn validate(definitions: &[RuleDefinition]) -> Vec<RuleError> {
        let mut seen = HashSet::new();
        let mut problems = Vec::new();
        for definition in definitions {
            if !seen.insert(definition.id.as_str()) {
                problems.push(RuleError::DuplicateId {
                    rule_id: definition.id.clone(),
                });
            }
            problems.extend(Rule::validate(definition));
        }
        problems
    }

    /// Compiles the rules of a parsed rule file.
    ///
    /// # Errors
    ///
    /// See [`RuleSet::from_definitions`].
    pub fn from_file(file: &RuleFile) -> Result<Self, RuleError> {
        Self::from_definitions(&file.rules)
    }

    /// Returns a rule set holding only the rules named in `ids`, still in
    /// configuration order.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnknownRule`] for the first id that names no
    /// rule.
    pub fn select<S: AsRef<str>>(&self, ids: &[S]) -> Result<Self, RuleError> {
        if let Some(missing) = ids.iter().find(|id| self.get(id.as_ref()).is_none()) {
            return Err(RuleError::UnknownRule {
                rule_id: missing.as_ref().to_owned(),
            });
        }
        let rules = self
            .rules
            .iter()
            .filter(|rule| ids.iter().any(|id| id.as_ref() == rule.id()))
            .cloned()
            .collect();
        Ok(Self { rules })
    }

    /// Returns the rule with identifier `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id() == id)
    }

    /// Iterates over the rules in configuration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns whether the set holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

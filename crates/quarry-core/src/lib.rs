//! Rule loading and the analysis driver for quarry.
//!
//! A run has three stages:
//!
//! 1. [`RuleFile`] is read from YAML and compiled into a [`RuleSet`]. Any
//!    malformed rule aborts the run before a single file is parsed.
//! 2. [`ScriptEnumerator`] discovers and parses source files. Each outcome
//!    is handed to [`Analyzer::register`], which reports it as
//!    [`AnalysisEvent::ScriptLoaded`] or [`AnalysisEvent::ScriptFailed`].
//! 3. [`Analyzer::run`] walks every loaded script in pre-order and yields
//!    one [`Issue`] per (node, rule) pair whose rule matches.
//!
//! The event order is fully determined by the inputs: registration order,
//! then tree order, then rule order.
//!
//! # Example
//!
//! ```
//! use quarry_core::{Analyzer, RuleFile, RuleSet, Script};
//! use camino::Utf8Path;
//!
//! let file = RuleFile::from_yaml(
//!     "rules:\n  - id: no-eval\n    pattern: call(identifier(\"eval\"), ...)\n    message: avoid eval\n",
//!     Utf8Path::new("quarry.yml"),
//! )?;
//! let rules = RuleSet::from_file(&file)?;
//! let mut analyzer = Analyzer::new(rules, ".");
//! analyzer.register("app.py", Script::parse("app.py", "eval(data)\n"));
//!
//! let ids: Vec<_> = analyzer.run().map(|issue| issue.rule().id().to_owned()).collect();
//! assert_eq!(ids, ["no-eval"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod analyzer;
pub mod config;
mod enumerator;
mod error;
mod event;
mod paths;
mod rule;
mod script;

pub use analyzer::{Analyzer, Issues};
pub use config::{PatternSource, RuleDefinition, RuleFile, Severity, locate_config};
pub use enumerator::ScriptEnumerator;
pub use error::{ConfigError, RuleError, ScriptError};
pub use event::{AnalysisEvent, Issue, MatchPair};
pub use rule::{PathFilter, Rule, RuleSet};
pub use script::Script;

pub use quarry_syntax::SupportedLanguage;

#[cfg(test)]
mod tests;

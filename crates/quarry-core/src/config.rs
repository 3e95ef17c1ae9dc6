//! Rule file loading.
//!
//! A rule file is a YAML document with a `rules` list and an optional
//! file-level `exclude` list:
//!
//! ```yaml
//! rules:
//!   - id: no-debug-print
//!     pattern: call(identifier("debug_print"), ...)
//!     message: Remove debug output before merging
//!     severity: error
//!     tags: [hygiene]
//!     exclude: ["scripts/**"]
//! exclude:
//!   - "vendor/**"
//! ```

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name looked up first when no rule file is given.
pub const DEFAULT_CONFIG_FILE: &str = "quarry.yml";

/// File name looked up when [`DEFAULT_CONFIG_FILE`] does not exist.
pub const FALLBACK_CONFIG_FILE: &str = "quarry.yaml";

/// How serious a rule's findings are. Passed through to reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must be fixed.
    Error,
    /// Should be fixed.
    #[default]
    Warning,
    /// Informational.
    Info,
    /// A suggestion.
    Hint,
}

impl Severity {
    /// Returns the lowercase name used in rule files and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Hint => "hint",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule's `pattern` field: one pattern or a list of alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternSource {
    /// A single pattern.
    One(String),
    /// Alternatives tried in order.
    Many(Vec<String>),
}

impl PatternSource {
    /// Returns the pattern texts in declared order.
    #[must_use]
    pub fn texts(&self) -> &[String] {
        match self {
            Self::One(text) => std::slice::from_ref(text),
            Self::Many(texts) => texts,
        }
    }
}

/// One rule as written in the rule file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Unique rule identifier.
    pub id: String,
    /// Pattern text or list of alternatives.
    pub pattern: PatternSource,
    /// Message shown for each finding.
    pub message: String,
    /// Finding severity.
    #[serde(default)]
    pub severity: Severity,
    /// Free-form labels.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Situations in which a finding may be acceptable.
    #[serde(default)]
    pub justification: Vec<String>,
    /// Globs a script path must match for the rule to apply.
    #[serde(default)]
    pub include: Vec<String>,
    /// Globs that stop the rule from applying.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// The whole rule file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFile {
    /// Rules in declaration order.
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
    /// Globs for files that are never analysed.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl RuleFile {
    /// Parses a rule file from YAML text. `origin` names the source in
    /// errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not a valid rule
    /// file.
    pub fn from_yaml(text: &str, origin: &Utf8Path) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_saphyr::from_str(text).map_err(|err| ConfigError::parse(origin, err.to_string()))
    }

    /// Reads and parses the rule file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when its content is invalid.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|err| ConfigError::io(path, err))?;
        Self::from_yaml(&text, path)
    }
}

/// Resolves which rule file to load.
///
/// An explicit path is used as given when it exists. Without one,
/// [`DEFAULT_CONFIG_FILE`] and then [`FALLBACK_CONFIG_FILE`] are tried in
/// `dir`.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] listing every candidate when none
/// exists.
pub fn locate_config(
    explicit: Option<&Utf8Path>,
    dir: &Utf8Path,
) -> Result<Utf8PathBuf, ConfigError> {
    let candidates: Vec<Utf8PathBuf> = match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => vec![dir.join(DEFAULT_CONFIG_FILE), dir.join(FALLBACK_CONFIG_FILE)],
    };
    candidates
        .iter()
        .find(|candidate| candidate.is_file())
        .cloned()
        .ok_or_else(|| ConfigError::not_found(candidates.iter().map(ToString::to_string)))
}

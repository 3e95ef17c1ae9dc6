//! Parsed units of analysis.

use camino::{Utf8Path, Utf8PathBuf};
use quarry_syntax::{Parser, SupportedLanguage, SyntaxNode};

use tracing::debug;

use crate::error::ScriptError;

const SCRIPT_TARGET: &str = "quarry::script";

/// One source file and its syntax tree.
///
/// Scripts are immutable once built; a file that fails to parse never
/// becomes a `Script` and is reported through [`ScriptError`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    path: Utf8PathBuf,
    language: SupportedLanguage,
    source: String,
    root: SyntaxNode,
}

impl Script {
    /// Builds a script from an already parsed tree.
    #[must_use]
    pub fn new(
        path: impl Into<Utf8PathBuf>,
        language: SupportedLanguage,
        source: impl Into<String>,
        root: SyntaxNode,
    ) -> Self {
        Self {
            path: path.into(),
            language,
            source: source.into(),
            root,
        }
    }

    /// Parses `source`, choosing the grammar from the extension of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::UnsupportedLanguage`] when the extension maps
    /// to no grammar, otherwise as [`Script::parse_as`].
    pub fn parse(path: impl Into<Utf8PathBuf>, source: &str) -> Result<Self, ScriptError> {
        let script_path = path.into();
        let language = detect_language(&script_path)?;
        Self::parse_as(script_path, language, source)
    }

    /// Parses `source` with the grammar for `language`.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Syntax`] when the parser reports any error
    /// node and [`ScriptError::Parser`] when no tree is produced.
    pub fn parse_as(
        path: impl Into<Utf8PathBuf>,
        language: SupportedLanguage,
        source: &str,
    ) -> Result<Self, ScriptError> {
        let parsed = Parser::new(language)?.parse(source)?;
        if parsed.has_errors() {
            let errors = parsed.errors();
            if let Some(first) = errors.first() {
                return Err(ScriptError::syntax(first, errors.len()));
            }
        }
        let (text, root) = parsed.into_parts();
        Ok(Self::new(path, language, text, root))
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Io`] when the file cannot be read, otherwise
    /// as [`Script::parse`].
    pub fn load(path: &Utf8Path) -> Result<Self, ScriptError> {
        let language = detect_language(path)?;
        let source = std::fs::read_to_string(path).map_err(ScriptError::io)?;
        Self::parse_as(path, language, &source)
    }

    /// Returns the script path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns the grammar the script was parsed with.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Returns the source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the root of the syntax tree.
    #[must_use]
    pub const fn root(&self) -> &SyntaxNode {
        &self.root
    }
}

fn detect_language(path: &Utf8Path) -> Result<SupportedLanguage, ScriptError> {
    SupportedLanguage::detect(path.as_std_path()).map_err(|reason| {
        debug!(target: SCRIPT_TARGET, path = %path, reason = %reason, "no grammar for script");
        ScriptError::unsupported_language(path)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_by_extension() {
        let script = Script::parse("lib/app.py", "print(1)\n").expect("parse");
        assert_eq!(script.language(), SupportedLanguage::Python);
        assert_eq!(script.path(), "lib/app.py");
        assert_eq!(script.root().kind(), "module");
        assert_eq!(script.source(), "print(1)\n");
    }

    #[rstest]
    #[case("notes.txt")]
    #[case("Makefile")]
    fn unknown_extensions_are_unsupported(#[case] path: &str) {
        let err = Script::parse(path, "").expect_err("no grammar");
        assert!(matches!(err, ScriptError::UnsupportedLanguage { .. }));
    }

    #[test]
    fn syntax_errors_fail_the_script() {
        let err = Script::parse("broken.rs", "fn main( {\n").expect_err("broken");
        let ScriptError::Syntax { line, count, .. } = err else {
            panic!("expected a syntax error, got {err:?}");
        };
        assert!(line >= 1);
        assert!(count >= 1);
    }

    #[test]
    fn missing_files_are_io_errors() {
        let err = Script::load(Utf8Path::new("does/not/exist.rs")).expect_err("missing");
        assert!(matches!(err, ScriptError::Io { .. }));
    }
}

//! Tab-separated line output.

use std::io::Write;

use camino::Utf8Path;
use quarry_core::{Issue, ScriptError};

use super::{Formatter, write_line};
use crate::errors::AppError;

/// Writes one line per finding as
/// `path:line:column<TAB>source line<TAB>message (rule id)`.
///
/// Load failures become `path<TAB>error: message` lines.
pub(crate) struct TextFormatter<W> {
    out: W,
}

impl<W: Write> TextFormatter<W> {
    pub(crate) const fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Formatter for TextFormatter<W> {
    fn script_failed(&mut self, path: &Utf8Path, error: &ScriptError) -> Result<(), AppError> {
        write_line(&mut self.out, &format!("{path}\terror: {error}"))
    }

    fn issue(&mut self, issue: &Issue<'_>) -> Result<(), AppError> {
        let (line, column) = issue.node().span().start.one_based();
        let rule = issue.rule();
        write_line(
            &mut self.out,
            &format!(
                "{}:{line}:{column}\t{}\t{} ({})",
                issue.script.path(),
                issue.source_line(),
                rule.message(),
                rule.id(),
            ),
        )
    }

    fn finish(&mut self) -> Result<(), AppError> {
        self.out.flush()?;
        Ok(())
    }
}

//! Rendering of analysis events and rule listings.
//!
//! A [`Formatter`] receives every event of a run in order and writes its
//! report to the wrapped writer. Load failures and issues share one stream
//! so a reader sees them in run order.

use std::io::Write;

use camino::Utf8Path;
use quarry_core::{AnalysisEvent, Issue, ScriptError};

use crate::errors::AppError;

mod json;
mod rules;
mod text;

pub(crate) use json::JsonFormatter;
pub(crate) use rules::{write_rule_problems, write_rules};
pub(crate) use text::TextFormatter;

/// Receives analysis events and renders them.
pub(crate) trait Formatter {
    /// Reports a script that could not be loaded.
    fn script_failed(&mut self, path: &Utf8Path, error: &ScriptError) -> Result<(), AppError>;

    /// Reports one finding.
    fn issue(&mut self, issue: &Issue<'_>) -> Result<(), AppError>;

    /// Completes the report once the run is over.
    fn finish(&mut self) -> Result<(), AppError>;

    /// Dispatches one event to the matching method.
    ///
    /// Successful loads produce no output.
    fn event(&mut self, event: &AnalysisEvent<'_>) -> Result<(), AppError> {
        match event {
            AnalysisEvent::ScriptLoaded(_) => Ok(()),
            AnalysisEvent::ScriptFailed { path, error } => self.script_failed(path, error),
            AnalysisEvent::IssueFound(issue) => self.issue(issue),
        }
    }
}

/// Writes `text` followed by a newline.
fn write_line<W: Write>(out: &mut W, text: &str) -> Result<(), AppError> {
    writeln!(out, "{text}")?;
    Ok(())
}

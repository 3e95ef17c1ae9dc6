//! Single-document JSON output.

use std::io::Write;

use camino::Utf8Path;
use quarry_core::{Issue, ScriptError, Severity};
use serde::Serialize;

use super::Formatter;
use crate::errors::AppError;

#[derive(Debug, Default, Serialize)]
struct Report {
    issues: Vec<IssueRecord>,
    errors: Vec<ErrorRecord>,
}

#[derive(Debug, Serialize)]
struct IssueRecord {
    script: String,
    rule: RuleRecord,
    location: LocationRecord,
    source: String,
}

#[derive(Debug, Serialize)]
struct RuleRecord {
    id: String,
    severity: Severity,
    message: String,
    tags: Vec<String>,
    justification: Vec<String>,
}

/// One-based `[line, column]` pairs.
#[derive(Debug, Serialize)]
struct LocationRecord {
    start: [u32; 2],
    end: [u32; 2],
}

#[derive(Debug, Serialize)]
struct ErrorRecord {
    path: String,
    message: String,
}

impl From<&Issue<'_>> for IssueRecord {
    fn from(issue: &Issue<'_>) -> Self {
        let rule = issue.rule();
        let span = issue.node().span();
        let (start_line, start_column) = span.start.one_based();
        let (end_line, end_column) = span.end.one_based();
        Self {
            script: issue.script.path().to_string(),
            rule: RuleRecord {
                id: rule.id().to_owned(),
                severity: rule.severity(),
                message: rule.message().to_owned(),
                tags: rule.tags().to_vec(),
                justification: rule.justification().to_vec(),
            },
            location: LocationRecord {
                start: [start_line, start_column],
                end: [end_line, end_column],
            },
            source: issue.source_text().to_owned(),
        }
    }
}

/// Collects the whole run and writes it as one pretty-printed JSON
/// document when the run finishes.
pub(crate) struct JsonFormatter<W> {
    out: W,
    report: Report,
}

impl<W: Write> JsonFormatter<W> {
    pub(crate) fn new(out: W) -> Self {
        Self {
            out,
            report: Report::default(),
        }
    }
}

impl<W: Write> Formatter for JsonFormatter<W> {
    fn script_failed(&mut self, path: &Utf8Path, error: &ScriptError) -> Result<(), AppError> {
        self.report.errors.push(ErrorRecord {
            path: path.to_string(),
            message: error.to_string(),
        });
        Ok(())
    }

    fn issue(&mut self, issue: &Issue<'_>) -> Result<(), AppError> {
        self.report.issues.push(IssueRecord::from(issue));
        Ok(())
    }

    fn finish(&mut self) -> Result<(), AppError> {
        serde_json::to_writer_pretty(&mut self.out, &self.report)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

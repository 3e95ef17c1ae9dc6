//! Command-line runtime for the quarry source checker.
//!
//! [`run`] parses arguments, installs diagnostics, loads the rule file and
//! drives `quarry-core`. Reports go to the supplied stdout writer and
//! fatal errors to the stderr writer, so tests can call [`run`] with
//! in-memory buffers.
//!
//! Exit status is success whenever the command completes. Findings and
//! scripts that fail to load are part of the report, not failures. Usage,
//! rule file, and rule errors exit with failure before any script is read.
//! `quarry test` is the exception: it completes by reporting rule errors,
//! and exits with failure when it found any.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use quarry_core::{
    AnalysisEvent, Analyzer, PathFilter, RuleFile, RuleSet, ScriptEnumerator, locate_config,
};
use tracing::{error, info};

mod cli;
mod errors;
mod output;
mod telemetry;

pub use cli::OutputFormat;
pub use telemetry::{LogFormat, TelemetryError};

use cli::{CheckArgs, Cli, Command, GlobalArgs};
use errors::AppError;
use output::{Formatter, JsonFormatter, TextFormatter, write_rule_problems, write_rules};

const CLI_TARGET: &str = "quarry::cli";

/// Owner name reported when a file-level exclusion glob is invalid.
const FILE_EXCLUDE_OWNER: &str = "exclude";

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    CliRunner { stdout, stderr }.run(args)
}

struct CliRunner<'a, W: Write, E: Write> {
    stdout: &'a mut W,
    stderr: &'a mut E,
}

impl<W: Write, E: Write> CliRunner<'_, W, E> {
    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        match self.dispatch(args) {
            Ok(code) => code,
            Err(AppError::CliUsage(usage)) if !usage.use_stderr() => {
                match write!(self.stdout, "{usage}") {
                    Ok(()) => ExitCode::SUCCESS,
                    Err(write_error) => {
                        self.report(&AppError::WriteReport(write_error));
                        ExitCode::FAILURE
                    }
                }
            }
            Err(failure) => {
                self.report(&failure);
                ExitCode::FAILURE
            }
        }
    }

    fn dispatch<I>(&mut self, args: I) -> Result<ExitCode, AppError>
    where
        I: IntoIterator<Item = OsString>,
    {
        let cli = Cli::try_parse_from(args).map_err(AppError::CliUsage)?;
        telemetry::initialise(&cli.global.log_filter, cli.global.log_format)?;
        match cli.command {
            Command::Check(check) => self.check(&cli.global, &check).map(|()| ExitCode::SUCCESS),
            Command::Test => self.test_rules(&cli.global),
            Command::Rules { ids } => self
                .list_rules(&cli.global, &ids)
                .map(|()| ExitCode::SUCCESS),
            Command::Version => {
                writeln!(self.stdout, "quarry {}", env!("CARGO_PKG_VERSION"))?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }

    fn check(&mut self, global: &GlobalArgs, args: &CheckArgs) -> Result<(), AppError> {
        let (config_path, file) = load_rule_file(global)?;
        let rules = build_rules(&file, &args.rules)?;
        let root = resolve_root(global, &config_path);
        let filter = PathFilter::new(FILE_EXCLUDE_OWNER, &[], &file.exclude)?;
        let inputs = if args.paths.is_empty() {
            vec![Utf8PathBuf::from(".")]
        } else {
            args.paths.clone()
        };

        let enumerator = ScriptEnumerator::new(root.clone())
            .with_filter(filter)
            .with_languages(args.languages.clone());
        let mut analyzer = Analyzer::new(rules, root);
        match args.format {
            OutputFormat::Text => report_run(
                &enumerator,
                &inputs,
                &mut analyzer,
                &mut TextFormatter::new(&mut *self.stdout),
            ),
            OutputFormat::Json => report_run(
                &enumerator,
                &inputs,
                &mut analyzer,
                &mut JsonFormatter::new(&mut *self.stdout),
            ),
        }
    }

    fn test_rules(&mut self, global: &GlobalArgs) -> Result<ExitCode, AppError> {
        let (path, file) = load_rule_file(global)?;
        let mut problems = RuleSet::validate(&file.rules);
        problems.extend(PathFilter::validate(FILE_EXCLUDE_OWNER, &[], &file.exclude));
        info!(
            target: CLI_TARGET,
            path = %path,
            rules = file.rules.len(),
            problems = problems.len(),
            "rule test finished"
        );
        write_rule_problems(self.stdout, file.rules.len(), &problems)?;
        Ok(if problems.is_empty() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }

    fn list_rules(&mut self, global: &GlobalArgs, ids: &[String]) -> Result<(), AppError> {
        let (_, file) = load_rule_file(global)?;
        let rules = build_rules(&file, ids)?;
        write_rules(self.stdout, &rules)
    }

    fn report(&mut self, failure: &AppError) {
        let written = match failure {
            AppError::CliUsage(usage) => write!(self.stderr, "{usage}"),
            _ => writeln!(self.stderr, "error: {failure}"),
        };
        if let Err(write_error) = written {
            error!(target: CLI_TARGET, error = %write_error, "failed to write to stderr");
        }
    }
}

fn load_rule_file(global: &GlobalArgs) -> Result<(Utf8PathBuf, RuleFile), AppError> {
    let path = locate_config(global.config.as_deref(), Utf8Path::new("."))?;
    let file = RuleFile::load(&path)?;
    info!(
        target: CLI_TARGET,
        path = %path,
        rules = file.rules.len(),
        "loaded rule file"
    );
    Ok((path, file))
}

fn build_rules(file: &RuleFile, ids: &[String]) -> Result<RuleSet, AppError> {
    let rules = RuleSet::from_file(file)?;
    if ids.is_empty() {
        Ok(rules)
    } else {
        Ok(rules.select(ids)?)
    }
}

/// Uses `--root` when given, otherwise the directory holding the rule file.
fn resolve_root(global: &GlobalArgs, config_path: &Utf8Path) -> Utf8PathBuf {
    if let Some(root) = &global.root {
        return root.clone();
    }
    config_path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .map_or_else(|| Utf8PathBuf::from("."), Utf8Path::to_path_buf)
}

fn report_run<F: Formatter>(
    enumerator: &ScriptEnumerator,
    inputs: &[Utf8PathBuf],
    analyzer: &mut Analyzer,
    formatter: &mut F,
) -> Result<(), AppError> {
    let mut failed = 0_usize;
    for (path, outcome) in enumerator.scripts(inputs) {
        let event = analyzer.register(path, outcome);
        if matches!(event, AnalysisEvent::ScriptFailed { .. }) {
            failed += 1;
        }
        formatter.event(&event)?;
    }

    let mut issues = 0_usize;
    for issue in analyzer.run() {
        issues += 1;
        formatter.event(&AnalysisEvent::IssueFound(issue))?;
    }
    formatter.finish()?;

    info!(
        target: CLI_TARGET,
        scripts = analyzer.scripts().count(),
        failed,
        issues,
        "check finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests;

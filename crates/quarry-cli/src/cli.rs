//! Command-line argument definitions.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use quarry_core::SupportedLanguage;

use crate::telemetry::LogFormat;

/// Report format for `quarry check`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// One tab-separated line per finding.
    #[default]
    Text,
    /// A single JSON document with every finding and load error.
    Json,
}

/// Command-line interface for the quarry source checker.
#[derive(Parser, Debug)]
#[command(name = "quarry", disable_help_subcommand = true)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) global: GlobalArgs,
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub(crate) struct GlobalArgs {
    /// Rule file to load instead of `quarry.yml` or `quarry.yaml`.
    #[arg(long, global = true, value_name = "PATH")]
    pub(crate) config: Option<Utf8PathBuf>,
    /// Directory that rule globs are relative to. Defaults to the
    /// directory holding the rule file.
    #[arg(long, global = true, value_name = "DIR")]
    pub(crate) root: Option<Utf8PathBuf>,
    /// Tracing filter expression for diagnostics on stderr.
    #[arg(
        long,
        global = true,
        env = "QUARRY_LOG",
        default_value = "warn",
        value_name = "FILTER"
    )]
    pub(crate) log_filter: String,
    /// Diagnostic log format.
    #[arg(long, global = true, default_value_t = LogFormat::Compact, value_name = "FORMAT")]
    pub(crate) log_format: LogFormat,
}

/// Subcommands of the `quarry` binary.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// Checks source files against the loaded rules.
    Check(CheckArgs),
    /// Compiles every rule and reports each problem without reading any
    /// source file.
    Test,
    /// Lists the loaded rules.
    Rules {
        /// Only list these rule ids.
        #[arg(value_name = "ID")]
        ids: Vec<String>,
    },
    /// Prints the version.
    Version,
}

/// Arguments of `quarry check`.
#[derive(Args, Debug, Clone)]
pub(crate) struct CheckArgs {
    /// Files or directories to check. Defaults to the current directory.
    #[arg(value_name = "PATH")]
    pub(crate) paths: Vec<Utf8PathBuf>,
    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
    /// Only run the rule with this id. May be repeated.
    #[arg(long = "rule", value_name = "ID")]
    pub(crate) rules: Vec<String>,
    /// Only check files of this language, such as `python`. May be
    /// repeated.
    #[arg(long = "language", value_name = "LANG")]
    pub(crate) languages: Vec<SupportedLanguage>,
}

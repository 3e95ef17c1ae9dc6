//! Error types for the CLI runtime.

use std::io;

use quarry_core::{ConfigError, RuleError};
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Everything that stops a command before it completes.
///
/// Script load failures are not here: they are part of the report.
#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Rules(#[from] RuleError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to write report: {0}")]
    WriteReport(#[from] io::Error),
    #[error("failed to serialise report: {0}")]
    SerialiseReport(#[from] serde_json::Error),
}

//! Error types shared across the pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while reading or validating input time series.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("cannot read profiles \"{}\": {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed profile CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("profile CSV is missing column \"{0}\"")]
    MissingColumn(String),
    #[error("row {row}: cannot parse timestamp \"{value}\"")]
    Timestamp { row: usize, value: String },
    #[error("row {row}: column \"{column}\" has invalid value \"{value}\"")]
    Value {
        row: usize,
        column: String,
        value: String,
    },
    #[error("profile \"{column}\" at row {row} is {value}, expected {expected}")]
    OutOfRange {
        row: usize,
        column: &'static str,
        value: f64,
        expected: &'static str,
    },
    #[error("timestamps must be strictly increasing (row {row})")]
    Unordered { row: usize },
    #[error("profile \"{column}\" has {len} values, expected {expected}")]
    LengthMismatch {
        column: &'static str,
        len: usize,
        expected: usize,
    },
    #[error("load profile sums to zero")]
    ZeroLoad,
    #[error("profile set is empty")]
    Empty,
}

/// Errors raised while formulating or solving the dispatch problem.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("network has no snapshots")]
    EmptyNetwork,
    #[error("dispatch problem is infeasible")]
    Infeasible,
    #[error("dispatch problem is unbounded")]
    Unbounded,
    #[error("solver failed: {0}")]
    Solver(String),
    #[error("solver backend \"{0}\" is not available in this build")]
    UnavailableBackend(String),
}

/// Top-level error for a complete run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{}", join_config_errors(.0))]
    Config(Vec<ConfigError>),
    #[error(transparent)]
    Profiles(#[from] ProfileError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("cannot write \"{}\": {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to render plot: {0}")]
    Plot(String),
}

fn join_config_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(vec![err])
    }
}

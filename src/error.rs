use std::path::PathBuf;

use thiserror::Error;

/// A single rejected input row. Row numbers count data rows from 1.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    #[error("row {row}: missing value for required column `{column}`")]
    MissingField { row: usize, column: &'static str },

    #[error("row {row}: unparseable created_date `{value}`")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: `{column}` must be a non-negative number, got `{value}`")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: malformed record: {message}")]
    Malformed { row: usize, message: String },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("no usable rows: all {rejected} rows were rejected")]
    NoUsableRows { rejected: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("channel `{0}` is not in the filtered table")]
    UnknownChannel(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

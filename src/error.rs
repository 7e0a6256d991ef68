// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid bounds for {name}: min {min} > max {max}")]
    InvalidBounds { name: &'static str, min: f64, max: f64 },

    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("{name} must be in (0, 1], got {value}")]
    InvalidFraction { name: &'static str, value: f64 },

    #[error("zoom snap marks must not be empty")]
    NoSnapMarks,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("snapshot path has no parent directory: {0}")]
    NoParent(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open replay file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed frame on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

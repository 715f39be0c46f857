use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while scanning the input directory for result files
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Invalid load level in {file_name}: '{segment}' is not a non-negative integer")]
    InvalidLoadLevel { file_name: String, segment: String },

    #[error("Failed to read input directory {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while turning one source file into typed rows
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to open {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Missing required column '{column}' in {path:?}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Invalid value '{value}' for column '{column}' at row {row} of {path:?}")]
    InvalidValue {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },
}

/// Errors raised when a derived metric would be undefined
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Mean CPU usage is zero at load level {load_level}: efficiency is undefined")]
    ZeroMeanCpu { load_level: u32 },

    #[error("Baseline efficiency is zero at load level {load_level}: normalization is undefined")]
    ZeroBaselineEfficiency { load_level: u32 },

    #[error("Efficiency at load level {load_level} is not finite")]
    NonFiniteEfficiency { load_level: u32 },
}

/// Errors raised by the logarithmic trend fit
#[derive(Debug, Error)]
pub enum TrendError {
    #[error("Concurrency must be strictly positive, got {concurrency}")]
    NonPositiveConcurrency { concurrency: u32 },

    #[error("Metric at concurrency {concurrency} is not finite")]
    NonFiniteMetric { concurrency: u32 },

    #[error("Cannot fit a trend: {reason}")]
    Degenerate { reason: String },
}

/// Errors raised while staging or committing chart artifacts
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to prepare output directory {path:?}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write artifact {name}: {reason}")]
    Write { name: String, reason: String },

    #[error("Failed to commit artifact {path:?}: {source}")]
    Commit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level error of a pipeline run. Every variant is fatal.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Trend(#[from] TrendError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("All {failed} discovered sources failed to load")]
    NoUsableSources { failed: usize },
}

//! Error types for configuration, grids and probability arithmetic.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal configuration problems. Raised before a planner exists.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required parameter: {name}")]
    Missing { name: &'static str },

    #[error("Malformed parameter line {line}: {content:?}")]
    Malformed { line: usize, content: String },

    #[error("Unsupported convolution granularity {value} (expected one of 12, 20, 30, 42, 72)")]
    UnsupportedGranularity { value: f64 },

    #[error("Parameter {name} = {value} is out of range: {expected}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("Observation width must be positive")]
    EmptyObservation,

    #[error("Failed to read parameter file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON parameters")]
    Json {
        #[source]
        source: serde_json::Error,
    },
}

/// Invalid occupancy grid input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("Occupancy grid must have at least one row and one column")]
    Empty,

    #[error("Row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Cell ({row}, {col}) holds {value}, expected 0 or 1")]
    InvalidCell { row: usize, col: usize, value: u8 },
}

/// Degenerate probability arithmetic.
#[derive(Debug, Error, PartialEq)]
pub enum InferenceError {
    #[error("Standard deviation must be positive and finite, got {sigma}")]
    DegenerateSigma { sigma: f64 },

    #[error("Distribution cannot be normalized: total mass is {total}")]
    DegenerateNormalization { total: f64 },

    #[error("Prior has {prior} entries but likelihood has {likelihood}")]
    SupportMismatch { prior: usize, likelihood: usize },
}

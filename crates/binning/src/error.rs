//! Error types for the binning core.

use thiserror::Error;

/// Errors that can occur while configuring or running a binning job.
#[derive(Error, Debug)]
pub enum BinningError {
    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// An aggregator refers to a variable the variable context does not know.
    #[error("unknown variable '{name}'")]
    UnknownVariable { name: String },

    /// A grid row query outside `[0, num_rows)`.
    #[error("row index {row} out of range, maximum is {max}")]
    RowOutOfRange { row: i64, max: i64 },

    /// A bin index outside `[0, num_bins)`.
    #[error("bin index {index} out of range, maximum is {max}")]
    BinOutOfRange { index: i64, max: i64 },

    /// A numeric value that does not fit its fixed-width encoding.
    #[error("value {value} out of range [{min}, {max}]")]
    ValueOutOfRange { value: i64, min: i64, max: i64 },

    /// Sampling table is malformed.
    #[error("invalid sampling table: {0}")]
    InvalidTable(String),

    /// The observation source failed.
    #[error("observation source error: {0}")]
    Source(String),

    /// The bin sink failed.
    #[error("bin sink error: {0}")]
    Sink(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration parse error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON encoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BinningError {
    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an UnknownVariable error.
    pub fn unknown_variable(name: impl Into<String>) -> Self {
        Self::UnknownVariable { name: name.into() }
    }

    /// Create a RowOutOfRange error for a grid with `num_rows` rows.
    pub fn row_out_of_range(row: i64, num_rows: i64) -> Self {
        Self::RowOutOfRange {
            row,
            max: num_rows - 1,
        }
    }

    /// Create a BinOutOfRange error for a grid with `num_bins` bins.
    pub fn bin_out_of_range(index: i64, num_bins: i64) -> Self {
        Self::BinOutOfRange {
            index,
            max: num_bins - 1,
        }
    }

    /// Create an InvalidTable error.
    pub fn invalid_table(msg: impl Into<String>) -> Self {
        Self::InvalidTable(msg.into())
    }

    /// Create a Source error.
    pub fn source_failed(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create a Sink error.
    pub fn sink_failed(msg: impl Into<String>) -> Self {
        Self::Sink(msg.into())
    }
}

/// Result type for binning operations.
pub type Result<T> = std::result::Result<T, BinningError>;

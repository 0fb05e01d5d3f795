use crate::domain::types::LocationId;
use thiserror::Error;

/// Errors raised by the detection analysis core
///
/// None of these are transient: every variant requires the caller to fix the
/// input table or the configuration before running again.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Schema error: missing required columns {missing:?} (available: {available:?})")]
    Schema { missing: Vec<String>, available: Vec<String> },

    #[error("Configuration error: invalid {parameter} {value:?} (expected one of: {expected})")]
    Config { parameter: String, value: String, expected: String },

    #[error("Integrity error: location {location_id} not found in location table ({context})")]
    Integrity { location_id: LocationId, context: String },

    #[error("Invalid value in row {row}, column {column:?}: {reason}")]
    InvalidValue { row: usize, column: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl AnalysisError {
    /// Create a configuration error for a parameter outside its domain
    pub fn config(parameter: &str, value: &str, expected: &str) -> Self {
        AnalysisError::Config {
            parameter: parameter.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Create an integrity error for an unresolvable location
    pub fn integrity(location_id: LocationId, context: impl Into<String>) -> Self {
        AnalysisError::Integrity { location_id, context: context.into() }
    }

    /// Create an invalid value error for a single cell
    pub fn invalid_value(row: usize, column: &str, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidValue { row, column: column.to_string(), reason: reason.into() }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AnalysisError::Schema { .. } => "schema",
            AnalysisError::Config { .. } => "config",
            AnalysisError::Integrity { .. } => "integrity",
            AnalysisError::InvalidValue { .. } => "invalid_value",
            AnalysisError::Io(_) => "io",
            AnalysisError::Json { .. } => "json",
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

//! Error handling for buoy QC operations.
//!
//! Business outcomes (out-of-range values, spikes, flat runs, missing data)
//! are encoded as indicator codes and never surface here. These variants
//! cover structural problems with configuration rows and observation tables,
//! plus failures of individual worker units.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Logger registry error: {message}")]
    LoggerRegistry { message: String },

    #[error("Parameter limits error: {message}")]
    ParameterLimits { message: String },

    #[error("Observation table error: {message}")]
    TableStructure { message: String },

    #[error("Parameter '{parameter}' could not be evaluated: {reason}")]
    ParameterEvaluation { parameter: String, reason: String },

    #[error("Worker failed for unit {unit}: {reason}")]
    WorkerFailed { unit: String, reason: String },
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a logger registry error
    pub fn logger_registry(message: impl Into<String>) -> Self {
        Self::LoggerRegistry {
            message: message.into(),
        }
    }

    /// Create a parameter limits error
    pub fn parameter_limits(message: impl Into<String>) -> Self {
        Self::ParameterLimits {
            message: message.into(),
        }
    }

    /// Create an observation table structure error
    pub fn table_structure(message: impl Into<String>) -> Self {
        Self::TableStructure {
            message: message.into(),
        }
    }

    /// Create a per-parameter evaluation error
    pub fn parameter_evaluation(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParameterEvaluation {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create a worker failure error
    pub fn worker_failed(unit: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WorkerFailed {
            unit: unit.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

//! Buoy QC Library
//!
//! A Rust library for quality-controlling marine data buoy observations.
//! Every value of every parameter gets a QC indicator, and each record gets
//! a record-level indicator derived from a set of key parameters.
//!
//! This library provides tools for:
//! - Resolving which hardware logger was recording for a station at a time
//! - Restricting observations to the live logger's data across logger swaps
//! - Per-station QC limits with defaults and station overrides
//! - Missing, range, spike and flat-line tests with indicator promotion
//! - Record-level aggregation over key parameters
//! - Reading and annotating polars `DataFrame`s
//! - Concurrent processing of many station periods with failure isolation
//!
//! # Indicator codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Not yet quality controlled |
//! | 1 | Good |
//! | 4 | Failed (range, spike or flat line) |
//! | 5 | Failed, value adjusted |
//! | 6 | Good, sensor-specific |
//! | 9 | Missing |

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod processor;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod indicator_aggregator;
        pub mod logger_registry;
        pub mod parameter_limits;
        pub mod qc_engine;
    }
    pub mod adapters {
        pub mod dataframe;
    }
}

// Re-export commonly used types
pub use app::adapters::dataframe::{FrameLayout, FrameReader, write_results};
pub use app::models::{Indicator, Limits, LoggerInterval, ObservationTable, ParameterColumn};
pub use app::services::indicator_aggregator::{AggregationStats, IndicatorAggregator};
pub use app::services::logger_registry::{
    LoggerFilterOutcome, LoggerRegistry, LoggerResolver, filter_by_live_loggers,
};
pub use app::services::parameter_limits::ParameterLimits;
pub use app::services::qc_engine::{QcEngine, QcReport};
pub use config::QcConfig;
pub use error::{Error, Result};
pub use processor::{BatchProcessor, BatchResult, QcUnit, QcUnitResult, StationQcProcessor};

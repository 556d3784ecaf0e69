//! Indicator-based quality control
//!
//! Every parameter is checked independently. The pipeline runs in a fixed
//! order over the parameter's samples sorted by timestamp:
//!
//! 1. Missing check: samples at 9 (or with no usable value) are set aside
//! 2. Range test against the effective min/max
//! 3. Spike test between adjacent non-missing samples
//! 4. Flat-line test over runs of identical non-missing values
//! 5. Promotion of everything still at 0 to 1
//!
//! Tests only ever move an indicator to 4. The resulting code does not
//! record which test fired; the per-parameter statistics do.
//!
//! The missing check moves an absent or non-finite value still at 0 to 9,
//! so a gap in the raw data reads as missing rather than good. Turning
//! `reclassify_missing` off drops that stage and such values are promoted
//! to 1. Either way they pass record-level aggregation.

pub mod engine;
pub mod stages;
pub mod stats;

#[cfg(test)]
mod tests;

pub use engine::QcEngine;
pub use stages::{QcSample, QcStage, SkippedTest, StageOutcome, build_pipeline};
pub use stats::{ParameterConcern, ParameterFailure, ParameterQcStats, QcReport};

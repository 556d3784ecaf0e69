//! QC statistics per parameter and per table

use super::stages::SkippedTest;
use crate::app::models::Limits;
use crate::constants::{FAILURE_RATE_CONCERN_FRACTION, MISSING_DATA_CONCERN_PERCENT};
use std::time::Duration;

/// Counts from running the pipeline over one parameter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterQcStats {
    pub parameter: String,

    /// Effective limits the pipeline was built from
    pub limits: Limits,

    pub total_values: usize,

    /// Samples at 9 after the missing check
    pub missing_values: usize,

    /// Samples the missing check moved to 9
    pub reclassified_missing: usize,

    pub range_failures: usize,
    pub spike_failures: usize,
    pub flat_line_failures: usize,

    /// Samples promoted from 0 to 1
    pub values_passed: usize,

    /// Samples ending at 4
    pub values_failed: usize,

    pub flat_line_window: usize,
    pub skipped_tests: Vec<SkippedTest>,
}

/// Data-quality concern raised by a parameter's statistics
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterConcern {
    /// More than half the values are missing
    SensorFailureLikely { missing_percentage: f64 },

    /// Range plus spike failures exceed a tenth of all values
    HighFailureRate { failures: usize },
}

impl ParameterQcStats {
    pub fn new(parameter: impl Into<String>, limits: Limits, flat_line_window: usize) -> Self {
        Self {
            parameter: parameter.into(),
            limits,
            flat_line_window,
            ..Self::default()
        }
    }

    pub fn missing_percentage(&self) -> f64 {
        if self.total_values == 0 {
            0.0
        } else {
            (self.missing_values as f64 / self.total_values as f64) * 100.0
        }
    }

    pub fn was_skipped(&self, test: SkippedTest) -> bool {
        self.skipped_tests.contains(&test)
    }

    /// Human-readable lines for each test that flagged something
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.range_failures > 0 {
            issues.push(format!(
                "{}: {} values outside range [{}, {}]",
                self.parameter,
                self.range_failures,
                bound_label(self.limits.min_value),
                bound_label(self.limits.max_value)
            ));
        }
        if self.spike_failures > 0 {
            issues.push(format!(
                "{}: {} spike values (>{} change)",
                self.parameter,
                self.spike_failures,
                bound_label(self.limits.spike_threshold)
            ));
        }
        if self.flat_line_failures > 0 {
            issues.push(format!(
                "{}: {} flat line values ({}+ consecutive identical)",
                self.parameter, self.flat_line_failures, self.flat_line_window
            ));
        }

        issues
    }

    pub fn concern(&self) -> Option<ParameterConcern> {
        let missing_percentage = self.missing_percentage();
        if missing_percentage > MISSING_DATA_CONCERN_PERCENT {
            return Some(ParameterConcern::SensorFailureLikely { missing_percentage });
        }

        let failures = self.range_failures + self.spike_failures;
        if failures as f64 > self.total_values as f64 * FAILURE_RATE_CONCERN_FRACTION {
            return Some(ParameterConcern::HighFailureRate { failures });
        }

        None
    }
}

fn bound_label(bound: Option<f64>) -> String {
    bound.map_or_else(|| "-".to_string(), |value| value.to_string())
}

/// A parameter the engine could not evaluate; its indicators are untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterFailure {
    pub parameter: String,
    pub reason: String,
}

/// Result of running QC over one table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QcReport {
    pub station: String,
    pub total_records: usize,
    pub parameters: Vec<ParameterQcStats>,
    pub failures: Vec<ParameterFailure>,
    pub duration: Duration,
}

impl QcReport {
    pub fn new(station: impl Into<String>, total_records: usize) -> Self {
        Self {
            station: station.into(),
            total_records,
            ..Self::default()
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterQcStats> {
        self.parameters.iter().find(|stats| stats.parameter == name)
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Issue lines across every evaluated parameter
    pub fn issues(&self) -> Vec<String> {
        self.parameters.iter().flat_map(|stats| stats.issues()).collect()
    }

    /// Values set to 4 by any test, across parameters
    pub fn total_failed_values(&self) -> usize {
        self.parameters.iter().map(|stats| stats.values_failed).sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "QC for station {}: {} records, {} parameters evaluated, {} failed values, {} parameter failures in {:.2}s",
            self.station,
            self.total_records,
            self.parameters.len(),
            self.total_failed_values(),
            self.failures.len(),
            self.duration.as_secs_f64()
        )
    }
}

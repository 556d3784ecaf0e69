//! Running the stage pipeline over every parameter of a table

use super::stages::{QcSample, QcStage, build_pipeline};
use super::stats::{ParameterFailure, ParameterQcStats, QcReport};
use crate::app::models::{Indicator, Limits, ObservationTable, ParameterColumn};
use crate::app::services::parameter_limits::ParameterLimits;
use crate::config::QcConfig;
use crate::constants::{FLAT_LINE_WINDOW, MIN_FLAT_LINE_WINDOW};
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Applies range, spike and flat-line tests to observation tables
#[derive(Debug, Clone)]
pub struct QcEngine {
    limits: Arc<ParameterLimits>,
    flat_line_window: usize,

    /// Move absent or non-finite values to 9 before the tests run
    reclassify_missing: bool,

    /// Restrict QC to these parameters; `None` evaluates every parameter
    parameters: Option<Vec<String>>,
}

impl QcEngine {
    pub fn new(limits: Arc<ParameterLimits>) -> Self {
        Self {
            limits,
            flat_line_window: FLAT_LINE_WINDOW,
            reclassify_missing: true,
            parameters: None,
        }
    }

    pub fn from_config(limits: Arc<ParameterLimits>, config: &QcConfig) -> Result<Self> {
        Ok(Self::new(limits)
            .with_flat_line_window(config.flat_line_window)?
            .with_missing_reclassification(config.reclassify_missing)
            .with_parameters(config.qc_parameters.clone()))
    }

    /// Set the flat-line run length
    ///
    /// # Errors
    /// Returns `Error::Configuration` for a window below 2
    pub fn with_flat_line_window(mut self, window: usize) -> Result<Self> {
        if window < MIN_FLAT_LINE_WINDOW {
            return Err(Error::configuration(format!(
                "flat_line_window must be at least {}, got {}",
                MIN_FLAT_LINE_WINDOW, window
            )));
        }
        self.flat_line_window = window;
        Ok(self)
    }

    pub fn with_missing_reclassification(mut self, enabled: bool) -> Self {
        self.reclassify_missing = enabled;
        self
    }

    pub fn with_parameters(mut self, parameters: Option<Vec<String>>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn limits(&self) -> &ParameterLimits {
        &self.limits
    }

    /// Run QC over every selected parameter of the table.
    ///
    /// Only indicator columns change. A parameter that cannot be evaluated
    /// is recorded in the report and left untouched; the others still run.
    pub fn apply(&self, table: &mut ObservationTable, station: &str) -> QcReport {
        let start_time = Instant::now();
        let mut report = QcReport::new(station, table.len());

        for rejected in table.rejected_parameters() {
            if self.is_selected(&rejected.name) {
                warn!(
                    "Skipping QC for {} at station {}: {}",
                    rejected.name, station, rejected.reason
                );
                report.failures.push(ParameterFailure {
                    parameter: rejected.name.clone(),
                    reason: rejected.reason.clone(),
                });
            }
        }

        if let Some(selected) = &self.parameters {
            for name in selected {
                let known = table.parameter(name).is_some()
                    || table.rejected_parameters().iter().any(|r| &r.name == name);
                if !known {
                    debug!("Parameter {} not present for station {}", name, station);
                }
            }
        }

        let order = table.time_order();
        for column in table.parameters_mut() {
            if !self.is_selected(column.name()) {
                continue;
            }

            let limits = self.limits.effective_limits(station, column.name());
            match self.evaluate_parameter(column, &order, limits) {
                Ok(stats) => {
                    debug!(
                        "QC {} at {}: {} missing, {} range, {} spike, {} flat line, {} passed",
                        stats.parameter,
                        station,
                        stats.missing_values,
                        stats.range_failures,
                        stats.spike_failures,
                        stats.flat_line_failures,
                        stats.values_passed
                    );
                    report.parameters.push(stats);
                }
                Err(e) => {
                    warn!("QC failed for station {}: {}", station, e);
                    report.failures.push(ParameterFailure {
                        parameter: column.name().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.duration = start_time.elapsed();
        report
    }

    /// Run the pipeline over one parameter column.
    ///
    /// `order` lists row positions in timestamp order. Indicators are only
    /// written back once every stage has run.
    pub fn evaluate_parameter(
        &self,
        column: &mut ParameterColumn,
        order: &[usize],
        limits: Limits,
    ) -> Result<ParameterQcStats> {
        if column.values().len() != order.len() || column.indicators().len() != order.len() {
            return Err(Error::parameter_evaluation(
                column.name(),
                format!(
                    "{} values and {} indicators for {} rows",
                    column.values().len(),
                    column.indicators().len(),
                    order.len()
                ),
            ));
        }

        let mut samples: Vec<QcSample> = Vec::with_capacity(order.len());
        for &row in order {
            let (Some(value), Some(indicator)) =
                (column.values().get(row), column.indicators().get(row))
            else {
                return Err(Error::parameter_evaluation(
                    column.name(),
                    format!("row {} outside column", row),
                ));
            };
            samples.push(QcSample::new(*value, *indicator));
        }

        let (stages, skipped) = build_pipeline(&limits, self.flat_line_window, self.reclassify_missing);
        let mut stats = ParameterQcStats::new(column.name(), limits, self.flat_line_window);
        stats.total_values = samples.len();
        stats.skipped_tests = skipped;

        for stage in stages {
            let outcome = stage.apply(samples);
            match stage {
                QcStage::MissingCheck => stats.reclassified_missing = outcome.flagged,
                QcStage::Range { .. } => stats.range_failures = outcome.flagged,
                QcStage::Spike { .. } => stats.spike_failures = outcome.flagged,
                QcStage::FlatLine { .. } => stats.flat_line_failures = outcome.flagged,
                QcStage::Promotion => stats.values_passed = outcome.flagged,
            }
            samples = outcome.samples;
        }

        stats.missing_values = samples.iter().filter(|s| s.indicator.is_missing()).count();
        stats.values_failed = samples
            .iter()
            .filter(|s| s.indicator == Indicator::Failed)
            .count();

        let indicators = column.indicators_mut();
        for (sample, &row) in samples.iter().zip(order) {
            indicators[row] = sample.indicator;
        }

        Ok(stats)
    }

    fn is_selected(&self, parameter: &str) -> bool {
        self.parameters
            .as_ref()
            .is_none_or(|selected| selected.iter().any(|name| name == parameter))
    }
}

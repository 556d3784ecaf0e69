//! Station QC pipeline
//!
//! A unit of work is one station's observations for one period (usually a
//! year). [`StationQcProcessor`] runs a unit through logger filtering, the
//! QC engine and record-level aggregation; [`batch::BatchProcessor`] runs
//! many units concurrently.

pub mod batch;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use batch::BatchProcessor;
pub use stats::{BatchResult, StationSummary, UnitFailure};

use crate::app::adapters::dataframe::{FrameReader, write_results};
use crate::app::models::ObservationTable;
use crate::app::services::indicator_aggregator::{AggregationStats, IndicatorAggregator};
use crate::app::services::logger_registry::{
    LoggerFilterOutcome, LoggerRegistry, LoggerResolver, filter_by_live_loggers,
};
use crate::app::services::parameter_limits::ParameterLimits;
use crate::app::services::qc_engine::{QcEngine, QcReport};
use crate::config::QcConfig;
use crate::{Error, Result};
use chrono::Datelike;
use polars::prelude::DataFrame;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One station's observations for one period
#[derive(Debug, Clone)]
pub struct QcUnit {
    pub station: String,

    /// Period label, e.g. the year
    pub label: String,

    pub table: ObservationTable,
}

impl QcUnit {
    pub fn new(station: impl Into<String>, label: impl Into<String>, table: ObservationTable) -> Self {
        Self {
            station: station.into(),
            label: label.into(),
            table,
        }
    }

    /// Split a station's table into one unit per calendar year (UTC),
    /// in ascending year order. Source row positions are preserved.
    pub fn split_by_year(station: &str, table: &ObservationTable) -> Result<Vec<QcUnit>> {
        let years: BTreeSet<i32> = table.timestamps().iter().map(|t| t.year()).collect();

        years
            .into_iter()
            .map(|year| {
                let keep: Vec<bool> = table.timestamps().iter().map(|t| t.year() == year).collect();
                Ok(QcUnit::new(station, year.to_string(), table.retain_rows(&keep)?))
            })
            .collect()
    }

    /// Identifier for logs and failure records
    pub fn id(&self) -> String {
        format!("{}/{}", self.station, self.label)
    }
}

/// Everything produced by processing one unit
#[derive(Debug, Clone)]
pub struct QcUnitResult {
    pub station: String,
    pub label: String,

    /// The annotated table, restricted to live logger rows when filtering applied
    pub table: ObservationTable,

    pub filter_outcome: LoggerFilterOutcome,

    /// Logger covering more than half of the unit's time span, if any
    pub majority_logger: Option<String>,

    pub qc_report: QcReport,
    pub aggregation: AggregationStats,
}

impl QcUnitResult {
    pub fn records(&self) -> usize {
        self.table.len()
    }

    pub fn qc_complete(&self) -> usize {
        self.table.qc_complete_count()
    }

    pub fn qc_complete_percentage(&self) -> f64 {
        if self.records() == 0 {
            0.0
        } else {
            (self.qc_complete() as f64 / self.records() as f64) * 100.0
        }
    }
}

/// Runs one unit through logger filtering, QC and aggregation
#[derive(Debug, Clone)]
pub struct StationQcProcessor {
    resolver: LoggerResolver,
    engine: QcEngine,
    aggregator: IndicatorAggregator,
    reader: FrameReader,
    enable_logger_filtering: bool,
}

impl StationQcProcessor {
    /// Build a processor over a shared registry and limits
    ///
    /// # Errors
    /// Returns `Error::Configuration` if the configuration fails validation
    pub fn new(
        registry: Arc<LoggerRegistry>,
        limits: Arc<ParameterLimits>,
        config: &QcConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            resolver: LoggerResolver::new(registry),
            engine: QcEngine::from_config(limits, config)?,
            aggregator: IndicatorAggregator::from_config(config),
            reader: FrameReader::from_config(config),
            enable_logger_filtering: config.enable_logger_filtering,
        })
    }

    pub fn resolver(&self) -> &LoggerResolver {
        &self.resolver
    }

    pub fn engine(&self) -> &QcEngine {
        &self.engine
    }

    pub fn reader(&self) -> &FrameReader {
        &self.reader
    }

    /// Process one unit
    ///
    /// # Errors
    /// Returns an error only for structural problems with the unit; data
    /// quality problems end up in indicators and the QC report
    pub fn process(&self, unit: QcUnit) -> Result<QcUnitResult> {
        let QcUnit {
            station,
            label,
            table,
        } = unit;

        if station.trim().is_empty() {
            return Err(Error::table_structure(format!(
                "Unit '{}' has no station id",
                label
            )));
        }

        debug!("Processing {}/{} with {} records", station, label, table.len());

        let majority_logger = table.time_span().and_then(|(start, end)| {
            self.resolver
                .resolve_majority(&station, start, end)
                .map(|resolved| resolved.interval.logger_id.clone())
        });

        let (mut table, filter_outcome) = if self.enable_logger_filtering {
            filter_by_live_loggers(table, &self.resolver, &station)?
        } else {
            (table, LoggerFilterOutcome::Disabled)
        };
        debug!("{}/{}: {}", station, label, filter_outcome.describe());

        let qc_report = self.engine.apply(&mut table, &station);
        for failure in &qc_report.failures {
            warn!(
                "{}/{}: parameter {} not evaluated: {}",
                station, label, failure.parameter, failure.reason
            );
        }

        let aggregation = self.aggregator.aggregate(&mut table);

        let result = QcUnitResult {
            station,
            label,
            table,
            filter_outcome,
            majority_logger,
            qc_report,
            aggregation,
        };

        info!(
            "{}/{}: {} records, {:.1}% QC complete",
            result.station,
            result.label,
            result.records(),
            result.qc_complete_percentage()
        );
        Ok(result)
    }

    /// Process a station frame and write the indicators back into it
    ///
    /// # Errors
    /// Fails if the frame cannot be read as an observation table (missing or
    /// unparseable time column, out-of-domain `qc_ind`) or rebuilt
    pub fn process_frame(
        &self,
        station: &str,
        label: &str,
        frame: &DataFrame,
    ) -> Result<(DataFrame, QcUnitResult)> {
        let table = self.reader.read(frame)?;
        let result = self.process(QcUnit::new(station, label, table))?;
        let annotated = write_results(frame, &result.table, self.reader.layout())?;
        Ok((annotated, result))
    }
}

//! In-memory observation table for one station and period
//!
//! Holds timestamps, logger tags, raw parameter values with their running
//! indicators, and the record-level indicator. Raw values are read-only once
//! a column is built; only indicators can be mutated.

use super::Indicator;
use crate::{Error, Result};
use chrono::{DateTime, Utc};

/// Raw values and indicators for one physical parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterColumn {
    name: String,
    values: Vec<Option<f64>>,
    indicators: Vec<Indicator>,
}

impl ParameterColumn {
    /// Create a column, validating that values and indicators line up
    pub fn new(
        name: impl Into<String>,
        values: Vec<Option<f64>>,
        indicators: Vec<Indicator>,
    ) -> Result<Self> {
        let name = name.into();
        if values.len() != indicators.len() {
            return Err(Error::parameter_evaluation(
                name,
                format!(
                    "{} values but {} indicators",
                    values.len(),
                    indicators.len()
                ),
            ));
        }

        Ok(Self {
            name,
            values,
            indicators,
        })
    }

    /// Create a column with every indicator at "not yet QC'd"
    pub fn unchecked(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        let indicators = vec![Indicator::NotChecked; values.len()];
        Self {
            name: name.into(),
            values,
            indicators,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn indicators(&self) -> &[Indicator] {
        &self.indicators
    }

    pub fn indicators_mut(&mut self) -> &mut [Indicator] {
        &mut self.indicators
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Count of observations currently at the given indicator
    pub fn count(&self, indicator: Indicator) -> usize {
        self.indicators.iter().filter(|i| **i == indicator).count()
    }

    fn select(&self, rows: &[usize]) -> Self {
        Self {
            name: self.name.clone(),
            values: rows.iter().map(|&row| self.values[row]).collect(),
            indicators: rows.iter().map(|&row| self.indicators[row]).collect(),
        }
    }
}

/// A parameter the table could not carry, with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedParameter {
    pub name: String,
    pub reason: String,
}

/// Observation table for one station and time period
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationTable {
    timestamps: Vec<DateTime<Utc>>,

    /// Logger tag per row, if the source carried one
    logger_tags: Option<Vec<String>>,

    /// Position of each row in the caller's original table
    source_rows: Vec<usize>,

    parameters: Vec<ParameterColumn>,

    /// Record-level indicator (`qc_ind`)
    record_indicators: Vec<Indicator>,

    rejected: Vec<RejectedParameter>,
}

impl ObservationTable {
    /// Create a table with no parameters; `qc_ind` starts at "not yet QC'd"
    pub fn new(timestamps: Vec<DateTime<Utc>>) -> Self {
        let rows = timestamps.len();
        Self {
            timestamps,
            logger_tags: None,
            source_rows: (0..rows).collect(),
            parameters: Vec::new(),
            record_indicators: vec![Indicator::NotChecked; rows],
            rejected: Vec::new(),
        }
    }

    /// Attach a logger tag to every row
    pub fn with_logger_tags(mut self, tags: Vec<String>) -> Result<Self> {
        self.check_length("logger tags", tags.len())?;
        self.logger_tags = Some(tags);
        Ok(self)
    }

    /// Replace the record-level indicators
    pub fn with_record_indicators(mut self, indicators: Vec<Indicator>) -> Result<Self> {
        self.check_length("record indicators", indicators.len())?;
        self.record_indicators = indicators;
        Ok(self)
    }

    /// Add a parameter column
    pub fn add_parameter(&mut self, column: ParameterColumn) -> Result<()> {
        if column.len() != self.len() {
            return Err(Error::parameter_evaluation(
                column.name(),
                format!("column has {} rows, table has {}", column.len(), self.len()),
            ));
        }
        if self.parameter(column.name()).is_some() {
            return Err(Error::parameter_evaluation(
                column.name(),
                "parameter already present in table",
            ));
        }

        self.parameters.push(column);
        Ok(())
    }

    /// Builder form of [`Self::add_parameter`]
    pub fn with_parameter(mut self, column: ParameterColumn) -> Result<Self> {
        self.add_parameter(column)?;
        Ok(self)
    }

    /// Record a parameter that could not be loaded into the table
    pub fn reject_parameter(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.rejected.push(RejectedParameter {
            name: name.into(),
            reason: reason.into(),
        });
    }

    fn check_length(&self, what: &str, len: usize) -> Result<()> {
        if len != self.len() {
            return Err(Error::table_structure(format!(
                "{} has {} rows, table has {}",
                what,
                len,
                self.len()
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn logger_tags(&self) -> Option<&[String]> {
        self.logger_tags.as_deref()
    }

    pub fn source_rows(&self) -> &[usize] {
        &self.source_rows
    }

    pub fn parameters(&self) -> &[ParameterColumn] {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut [ParameterColumn] {
        &mut self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterColumn> {
        self.parameters.iter().find(|column| column.name() == name)
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|column| column.name()).collect()
    }

    pub fn record_indicators(&self) -> &[Indicator] {
        &self.record_indicators
    }

    pub fn record_indicators_mut(&mut self) -> &mut [Indicator] {
        &mut self.record_indicators
    }

    pub fn rejected_parameters(&self) -> &[RejectedParameter] {
        &self.rejected
    }

    /// Earliest and latest timestamp in the table
    pub fn time_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = *self.timestamps.iter().min()?;
        let last = *self.timestamps.iter().max()?;
        Some((first, last))
    }

    /// Row positions in ascending timestamp order; ties keep row order
    pub fn time_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by_key(|&row| self.timestamps[row]);
        order
    }

    /// Number of records whose `qc_ind` is 1
    pub fn qc_complete_count(&self) -> usize {
        self.record_indicators
            .iter()
            .filter(|indicator| **indicator == Indicator::Good)
            .count()
    }

    /// New table holding only the rows where `keep` is true.
    ///
    /// Source row positions are carried over so results can be mapped back
    /// onto the caller's original table.
    pub fn retain_rows(&self, keep: &[bool]) -> Result<Self> {
        self.check_length("row mask", keep.len())?;

        let rows: Vec<usize> = keep
            .iter()
            .enumerate()
            .filter_map(|(row, keep)| keep.then_some(row))
            .collect();

        Ok(Self {
            timestamps: rows.iter().map(|&row| self.timestamps[row]).collect(),
            logger_tags: self
                .logger_tags
                .as_ref()
                .map(|tags| rows.iter().map(|&row| tags[row].clone()).collect()),
            source_rows: rows.iter().map(|&row| self.source_rows[row]).collect(),
            parameters: self.parameters.iter().map(|c| c.select(&rows)).collect(),
            record_indicators: rows.iter().map(|&row| self.record_indicators[row]).collect(),
            rejected: self.rejected.clone(),
        })
    }
}

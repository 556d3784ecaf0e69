//! Loading QC limits from rows and frames
//!
//! Rows follow the limits CSV layout (`parameter`, `station`, `min_value`,
//! `max_value`, `spike_threshold`, `notes`). Invalid rows are discarded with
//! a warning; a later row for the same station and parameter replaces the
//! earlier one.

use super::ParameterLimits;
use crate::app::adapters::dataframe::{optional_f64_column, optional_string_column, string_column};
use crate::app::models::Limits;
use crate::constants::columns;
use crate::{Error, Result};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// One row of the limits table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterLimitRow {
    pub parameter: String,

    /// Station id, or `"default"`
    pub station: String,

    #[serde(default)]
    pub min_value: Option<f64>,

    #[serde(default)]
    pub max_value: Option<f64>,

    #[serde(default)]
    pub spike_threshold: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ParameterLimitRow {
    pub fn new(station: &str, parameter: &str, limits: Limits) -> Self {
        Self::from_limits(parameter, station, &limits)
    }

    pub(super) fn from_limits(parameter: &str, station: &str, limits: &Limits) -> Self {
        Self {
            parameter: parameter.to_string(),
            station: station.to_string(),
            min_value: limits.min_value,
            max_value: limits.max_value,
            spike_threshold: limits.spike_threshold,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn limits(&self) -> Limits {
        Limits::new(self.min_value, self.max_value, self.spike_threshold)
    }

    /// Check the row can be used: named parameter and station, sane limits
    pub fn validate(&self) -> Result<()> {
        if self.parameter.trim().is_empty() {
            return Err(Error::parameter_limits(format!(
                "Missing {} for station '{}'",
                columns::LIMIT_PARAMETER,
                self.station.trim()
            )));
        }
        if self.station.trim().is_empty() {
            return Err(Error::parameter_limits(format!(
                "Missing {} for parameter '{}'",
                columns::LIMIT_STATION,
                self.parameter.trim()
            )));
        }

        self.limits().validate().map_err(|e| {
            Error::parameter_limits(format!(
                "{} at {}: {}",
                self.parameter.trim(),
                self.station.trim(),
                e
            ))
        })
    }
}

/// Statistics from loading a limits table
#[derive(Debug, Clone, Default)]
pub struct LimitsLoadStats {
    pub rows_seen: usize,
    pub rows_loaded: usize,
    pub rows_discarded: usize,

    /// Rows that replaced an earlier row for the same station and parameter
    pub rows_replaced: usize,

    pub load_duration: Duration,
    pub errors: Vec<String>,
}

impl LimitsLoadStats {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Loaded {} QC limit entries from {} rows ({} discarded, {} replaced) in {:.2}s",
            self.rows_loaded,
            self.rows_seen,
            self.rows_discarded,
            self.rows_replaced,
            self.load_duration.as_secs_f64()
        )
    }
}

impl ParameterLimits {
    /// Build the limits table from rows in source order
    pub fn from_rows(rows: impl IntoIterator<Item = ParameterLimitRow>) -> (Self, LimitsLoadStats) {
        let start_time = Instant::now();
        let mut stats = LimitsLoadStats::default();
        let mut limits = Self::new();

        for row in rows {
            stats.rows_seen += 1;

            if let Err(e) = row.validate() {
                warn!("Discarding QC limits row {}: {}", stats.rows_seen, e);
                stats.rows_discarded += 1;
                stats.errors.push(format!("row {}: {}", stats.rows_seen, e));
                continue;
            }

            if limits.insert(row.station.trim(), row.parameter.trim(), row.limits()) {
                stats.rows_replaced += 1;
            }
            stats.rows_loaded += 1;
        }

        stats.load_duration = start_time.elapsed();
        info!("{}", stats.summary());
        (limits, stats)
    }

    /// Build the limits table from a polars frame.
    ///
    /// `parameter` and `station` are required; the numeric columns and
    /// `notes` are optional and read as absent when missing.
    ///
    /// # Errors
    /// * Returns `Error::ParameterLimits` if a required column is missing
    /// * Returns `Error::Polars` if a column cannot be cast
    pub fn from_dataframe(frame: &DataFrame) -> Result<(Self, LimitsLoadStats)> {
        for required in [columns::LIMIT_PARAMETER, columns::LIMIT_STATION] {
            if frame.column(required).is_err() {
                return Err(Error::parameter_limits(format!(
                    "Limits table is missing required column '{}'",
                    required
                )));
            }
        }

        let parameters = string_column(frame, columns::LIMIT_PARAMETER)?;
        let stations = string_column(frame, columns::LIMIT_STATION)?;
        let minimums = optional_f64_column(frame, columns::LIMIT_MIN)?;
        let maximums = optional_f64_column(frame, columns::LIMIT_MAX)?;
        let spikes = optional_f64_column(frame, columns::LIMIT_SPIKE)?;
        let notes = optional_string_column(frame, columns::LIMIT_NOTES)?;

        let rows = (0..frame.height()).map(|i| ParameterLimitRow {
            parameter: parameters[i].clone().unwrap_or_default(),
            station: stations[i].clone().unwrap_or_default(),
            min_value: minimums[i],
            max_value: maximums[i],
            spike_threshold: spikes[i],
            notes: notes[i].clone(),
        });

        Ok(Self::from_rows(rows))
    }
}

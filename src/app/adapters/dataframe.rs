//! Conversion between polars frames and observation tables
//!
//! Reading picks the time column, the optional logger column and every
//! parameter `p` that has an `ind_p` column beside it. Raw values are cast
//! to `Float64` and indicators to `Int32`. A parameter whose columns cannot
//! be read is rejected on its own; only a bad time column or `qc_ind` makes
//! the whole frame unusable.
//!
//! Writing maps the table back onto the caller's frame: rows dropped by
//! logger filtering are taken out, indicator columns and `qc_ind` are
//! replaced with `Int32` columns, everything else is carried through.

use crate::app::models::{Indicator, ObservationTable, ParameterColumn};
use crate::app::services::logger_registry::parse_timestamp;
use crate::config::QcConfig;
use crate::constants::{DEFAULT_TIMESTAMP_FORMATS, INDICATOR_PREFIX, columns};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Column naming for observation frames
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameLayout {
    pub time_column: String,
    pub logger_column: String,
    pub indicator_prefix: String,
    pub record_indicator_column: String,
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self {
            time_column: columns::TIME.to_string(),
            logger_column: columns::LOGGER_ID.to_string(),
            indicator_prefix: INDICATOR_PREFIX.to_string(),
            record_indicator_column: columns::RECORD_INDICATOR.to_string(),
        }
    }
}

impl FrameLayout {
    pub fn indicator_column(&self, parameter: &str) -> String {
        format!("{}{}", self.indicator_prefix, parameter)
    }

    /// Parameters with both a raw and an indicator column, in frame order
    pub fn discover_parameters(&self, frame: &DataFrame) -> Vec<String> {
        let names: Vec<&str> = frame
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .collect();

        names
            .iter()
            .filter_map(|name| name.strip_prefix(self.indicator_prefix.as_str()))
            .filter(|parameter| !parameter.is_empty() && names.contains(parameter))
            .map(str::to_string)
            .collect()
    }
}

/// Reads observation tables out of polars frames
#[derive(Debug, Clone)]
pub struct FrameReader {
    layout: FrameLayout,
    timestamp_formats: Vec<String>,

    /// Explicit parameter list; `None` discovers them from the frame
    parameters: Option<Vec<String>>,
}

impl Default for FrameReader {
    fn default() -> Self {
        Self {
            layout: FrameLayout::default(),
            timestamp_formats: DEFAULT_TIMESTAMP_FORMATS
                .iter()
                .map(|format| format.to_string())
                .collect(),
            parameters: None,
        }
    }
}

impl FrameReader {
    pub fn new(layout: FrameLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    pub fn from_config(config: &QcConfig) -> Self {
        Self::new(config.frame.clone()).with_timestamp_formats(config.timestamp_formats.clone())
    }

    pub fn with_timestamp_formats(mut self, formats: Vec<String>) -> Self {
        self.timestamp_formats = formats;
        self
    }

    pub fn with_parameters(mut self, parameters: Option<Vec<String>>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// Build an observation table from a frame.
    ///
    /// # Errors
    /// * `Error::TableStructure` if the time column is missing or holds a
    ///   null or unparseable time, or if `qc_ind` holds a code outside the
    ///   indicator domain
    /// * `Error::Polars` if the time or logger column cannot be read
    pub fn read(&self, frame: &DataFrame) -> Result<ObservationTable> {
        let timestamps = self.read_timestamps(frame)?;
        let mut table = ObservationTable::new(timestamps);

        if frame.column(&self.layout.logger_column).is_ok() {
            let tags = string_column(frame, &self.layout.logger_column)?
                .into_iter()
                .map(Option::unwrap_or_default)
                .collect();
            table = table.with_logger_tags(tags)?;
        } else {
            debug!("No {} column in frame", self.layout.logger_column);
        }

        if frame.column(&self.layout.record_indicator_column).is_ok() {
            let codes = indicator_codes(frame, &self.layout.record_indicator_column)?;
            let indicators = codes
                .into_iter()
                .map(Indicator::try_from)
                .collect::<Result<Vec<_>>>()
                .map_err(|e| {
                    Error::table_structure(format!(
                        "{}: {}",
                        self.layout.record_indicator_column, e
                    ))
                })?;
            table = table.with_record_indicators(indicators)?;
        }

        let parameters = match &self.parameters {
            Some(parameters) => parameters.clone(),
            None => self.layout.discover_parameters(frame),
        };

        for parameter in parameters {
            match self.read_parameter(frame, &parameter) {
                Ok(column) => table.add_parameter(column)?,
                Err(e) => {
                    warn!("Rejecting parameter {}: {}", parameter, e);
                    table.reject_parameter(parameter, e.to_string());
                }
            }
        }

        debug!(
            "Read {} rows with parameters [{}]",
            table.len(),
            table.parameter_names().join(", ")
        );
        Ok(table)
    }

    fn read_parameter(&self, frame: &DataFrame, parameter: &str) -> Result<ParameterColumn> {
        let indicator_name = self.layout.indicator_column(parameter);

        let values = f64_column(frame, parameter)
            .map_err(|e| Error::parameter_evaluation(parameter, e.to_string()))?;
        let codes = indicator_codes(frame, &indicator_name)
            .map_err(|e| Error::parameter_evaluation(parameter, e.to_string()))?;
        let indicators = codes
            .into_iter()
            .map(Indicator::try_from)
            .collect::<Result<Vec<_>>>()
            .map_err(|e| Error::parameter_evaluation(parameter, e.to_string()))?;

        ParameterColumn::new(parameter, values, indicators)
    }

    fn read_timestamps(&self, frame: &DataFrame) -> Result<Vec<DateTime<Utc>>> {
        let name = self.layout.time_column.as_str();
        let column = frame.column(name).map_err(|_| {
            Error::table_structure(format!("Observation frame has no '{}' column", name))
        })?;
        let series = column.as_materialized_series();

        let parsed: Vec<Option<DateTime<Utc>>> = match series.dtype() {
            DataType::Datetime(unit, _) => {
                let unit = *unit;
                series
                    .cast(&DataType::Int64)?
                    .i64()?
                    .into_iter()
                    .map(|raw| raw.and_then(|raw| from_epoch(raw, unit)))
                    .collect()
            }
            DataType::Date => series
                .cast(&DataType::Int32)?
                .i32()?
                .into_iter()
                .map(|days| days.and_then(from_epoch_days))
                .collect(),
            _ => series
                .cast(&DataType::String)?
                .str()?
                .into_iter()
                .map(|text| text.and_then(|text| parse_timestamp(text, &self.timestamp_formats)))
                .collect(),
        };

        parsed
            .into_iter()
            .enumerate()
            .map(|(row, time)| {
                time.ok_or_else(|| {
                    Error::table_structure(format!(
                        "Missing or unparseable time in '{}' at row {}",
                        name, row
                    ))
                })
            })
            .collect()
    }
}

fn from_epoch(raw: i64, unit: TimeUnit) -> Option<DateTime<Utc>> {
    match unit {
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(raw),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(raw),
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(raw)),
    }
}

fn from_epoch_days(days: i32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?
        .checked_add_signed(chrono::Duration::days(i64::from(days)))?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
}

/// Write QC results back onto the frame the table was read from.
///
/// Rows the table no longer holds are dropped; every parameter's indicator
/// column and the record indicator column are replaced.
///
/// # Errors
/// * `Error::TableStructure` if the table refers to rows the frame lacks
/// * `Error::Polars` if the frame cannot be rebuilt
pub fn write_results(
    frame: &DataFrame,
    table: &ObservationTable,
    layout: &FrameLayout,
) -> Result<DataFrame> {
    let mut positions: Vec<IdxSize> = Vec::with_capacity(table.len());
    for &row in table.source_rows() {
        if row >= frame.height() {
            return Err(Error::table_structure(format!(
                "Table row {} outside frame of {} rows",
                row,
                frame.height()
            )));
        }
        let position = IdxSize::try_from(row).map_err(|_| {
            Error::table_structure(format!("Row {} does not fit the frame index", row))
        })?;
        positions.push(position);
    }

    let mut output = if positions.len() == frame.height() {
        frame.clone()
    } else {
        frame.take(&IdxCa::from_vec("rows".into(), positions))?
    };

    for column in table.parameters() {
        let codes: Vec<i32> = column.indicators().iter().map(|i| i32::from(*i)).collect();
        let name = layout.indicator_column(column.name());
        output.with_column(Series::new(name.as_str().into(), codes))?;
    }

    let record_codes: Vec<i32> = table
        .record_indicators()
        .iter()
        .map(|i| i32::from(*i))
        .collect();
    output.with_column(Series::new(
        layout.record_indicator_column.as_str().into(),
        record_codes,
    ))?;

    Ok(output)
}

/// Column cast to text; numeric columns are rendered as their decimal form
pub(crate) fn string_column(frame: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = frame
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Like [`string_column`], but an absent column reads as all nulls
pub(crate) fn optional_string_column(frame: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    if frame.column(name).is_err() {
        return Ok(vec![None; frame.height()]);
    }
    string_column(frame, name)
}

pub(crate) fn f64_column(frame: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = frame
        .column(name)?
        .as_materialized_series()
        .strict_cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

/// Like [`f64_column`], but an absent column reads as all nulls
pub(crate) fn optional_f64_column(frame: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    if frame.column(name).is_err() {
        return Ok(vec![None; frame.height()]);
    }
    f64_column(frame, name)
}

/// Indicator codes as `i32`, nulls read as 0
fn indicator_codes(frame: &DataFrame, name: &str) -> Result<Vec<i32>> {
    let series = frame
        .column(name)?
        .as_materialized_series()
        .strict_cast(&DataType::Int32)?;
    Ok(series
        .i32()?
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

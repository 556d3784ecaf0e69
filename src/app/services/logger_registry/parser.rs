//! Logger interval row parsing
//!
//! Rows arrive from the station log of loggers with free-text timestamps
//! and loosely typed flags. Timestamp parsing is a pure function over an
//! explicit ordered list of formats and never fails across this boundary:
//! it yields `None` for anything it cannot read.

use crate::app::models::LoggerInterval;
use crate::constants::{FALLBACK_DATE_FORMATS, FALLBACK_DATETIME_FORMATS, columns};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One raw row of the log of loggers, as produced by a CSV reader or the
/// dataframe adapter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerIntervalRow {
    #[serde(rename = "Buoy")]
    pub station: String,

    #[serde(rename = "Loggerid")]
    pub logger_id: String,

    #[serde(rename = "Start", default)]
    pub start: Option<String>,

    #[serde(rename = "End", default)]
    pub end: Option<String>,

    #[serde(rename = "Live", default)]
    pub live: Option<String>,

    #[serde(rename = "Live_wave", default)]
    pub live_wave: Option<String>,

    #[serde(rename = "Comment", default)]
    pub comment: Option<String>,
}

/// Parse a timestamp against an ordered list of accepted formats.
///
/// Each configured format is tried in turn (as a datetime, then as a date at
/// midnight). If none match, a generic fallback accepts RFC 3339, ISO `T`
/// forms, fractional seconds and date-only values. All results are UTC.
pub fn parse_timestamp<S: AsRef<str>>(value: &str, formats: &[S]) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if is_null_token(value) {
        return None;
    }

    formats
        .iter()
        .find_map(|format| parse_with_format(value, format.as_ref()))
        .or_else(|| parse_generic(value))
}

fn parse_with_format(value: &str, format: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, format)
        .map(|naive| naive.and_utc())
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, format)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}

fn parse_generic(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S %z") {
        return Some(parsed.with_timezone(&Utc));
    }

    FALLBACK_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| {
            FALLBACK_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}

/// Empty cells and the usual null spellings from spreadsheet exports
fn is_null_token(value: &str) -> bool {
    value.is_empty()
        || ["nan", "nat", "na", "null", "none"]
            .iter()
            .any(|token| value.eq_ignore_ascii_case(token))
}

/// Interpret a loosely typed boolean cell. Empty or missing means false.
pub fn parse_flag(value: Option<&str>) -> bool {
    let Some(value) = value.map(str::trim) else {
        return false;
    };

    if let Ok(number) = value.parse::<f64>() {
        return number != 0.0;
    }

    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "t" | "yes" | "y"
    )
}

fn optional_text(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !is_null_token(text))
}

/// Convert a raw row into a logger interval.
///
/// Rows are rejected when the station or logger id is empty, the start or a
/// present end timestamp cannot be parsed, or the end precedes the start.
pub fn parse_interval_row<S: AsRef<str>>(
    row: &LoggerIntervalRow,
    formats: &[S],
) -> Result<LoggerInterval> {
    let station = row.station.trim();
    if station.is_empty() {
        return Err(Error::logger_registry(format!(
            "Missing {} for logger '{}'",
            columns::LOGGER_STATION,
            row.logger_id.trim()
        )));
    }

    let logger_id = row.logger_id.trim();
    if logger_id.is_empty() {
        return Err(Error::logger_registry(format!(
            "Missing {} for station {}",
            columns::LOGGER_LOGGER_ID,
            station
        )));
    }

    let start_text = optional_text(&row.start).unwrap_or_default();
    let start_time = parse_timestamp(start_text, formats).ok_or_else(|| {
        Error::logger_registry(format!(
            "Invalid start time '{}' for {} - {}",
            start_text, station, logger_id
        ))
    })?;

    let end_time = match optional_text(&row.end) {
        Some(end_text) => Some(parse_timestamp(end_text, formats).ok_or_else(|| {
            Error::logger_registry(format!(
                "Invalid end time '{}' for {} - {}",
                end_text, station, logger_id
            ))
        })?),
        None => None,
    };

    if let Some(end) = end_time {
        if end < start_time {
            return Err(Error::logger_registry(format!(
                "End time {} precedes start time {} for {} - {}",
                end, start_time, station, logger_id
            )));
        }
    }

    let interval = LoggerInterval {
        logger_id: logger_id.to_string(),
        station: station.to_string(),
        start_time,
        end_time,
        is_live: parse_flag(optional_text(&row.live)),
        is_live_wave: parse_flag(optional_text(&row.live_wave)),
        comment: optional_text(&row.comment).unwrap_or_default().to_string(),
    };

    if interval.token().is_empty() {
        return Err(Error::logger_registry(format!(
            "Logger id '{}' for station {} has an empty match token",
            logger_id, station
        )));
    }

    Ok(interval)
}

//! Shared test utilities and fixtures for logger registry tests

use crate::app::models::{LoggerInterval, ObservationTable, ParameterColumn};
use crate::app::services::logger_registry::{LoggerIntervalRow, LoggerRegistry, LoggerResolver};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;


/// Midnight UTC on the given date
pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Create a test interval with standard station and comment
pub fn create_test_interval(
    station: &str,
    logger_id: &str,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    is_live: bool,
) -> LoggerInterval {
    LoggerInterval {
        logger_id: logger_id.to_string(),
        station: station.to_string(),
        start_time: start,
        end_time: end,
        is_live,
        is_live_wave: false,
        comment: String::new(),
    }
}

/// Create a raw row the way a CSV reader would hand it over
pub fn create_test_row(
    station: &str,
    logger_id: &str,
    start: &str,
    end: Option<&str>,
    live: &str,
) -> LoggerIntervalRow {
    LoggerIntervalRow {
        station: station.to_string(),
        logger_id: logger_id.to_string(),
        start: Some(start.to_string()),
        end: end.map(str::to_string),
        live: Some(live.to_string()),
        live_wave: None,
        comment: None,
    }
}

/// Station 62091 swaps loggers mid-2023; a spare logger is installed but
/// never live. Station 62092 has a single open-ended logger.
pub fn create_test_registry() -> LoggerRegistry {
    LoggerRegistry::from_intervals(vec![
        create_test_interval("62091", "9100_CR6", utc(2023, 7, 1), None, true),
        create_test_interval(
            "62091",
            "8704_CR6",
            utc(2022, 1, 1),
            Some(utc(2023, 7, 1)),
            true,
        ),
        create_test_interval("62091", "7777_CR1000", utc(2022, 1, 1), None, false),
        create_test_interval("62092", "5120_CR6", utc(2021, 3, 1), None, true),
    ])
}

pub fn create_test_resolver() -> LoggerResolver {
    LoggerResolver::new(Arc::new(create_test_registry()))
}

/// Daily observations across 2023 tagged with whichever logger recorded them
pub fn create_tagged_table(tags: &[&str]) -> ObservationTable {
    let timestamps: Vec<DateTime<Utc>> = (0..tags.len())
        .map(|day| utc(2023, 1, 1) + chrono::Duration::days(day as i64 * 30))
        .collect();
    let values = (0..tags.len()).map(|i| Some(i as f64)).collect();

    ObservationTable::new(timestamps)
        .with_logger_tags(tags.iter().map(|t| t.to_string()).collect())
        .unwrap()
        .with_parameter(ParameterColumn::unchecked("hm0", values))
        .unwrap()
}

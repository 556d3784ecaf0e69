//! Tests for the station pipeline and batch runner
//!
//! Fixtures model station 62091, whose live logger changes from 8704_CR6 to
//! 9100_CR6 on 1 July 2023, and station 62092 with a single logger.

use crate::app::models::{LoggerInterval, ObservationTable, ParameterColumn};
use crate::app::services::logger_registry::LoggerRegistry;
use crate::app::services::parameter_limits::ParameterLimits;
use crate::config::QcConfig;
use crate::processor::StationQcProcessor;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;


pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

fn interval(station: &str, logger_id: &str, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> LoggerInterval {
    LoggerInterval {
        logger_id: logger_id.to_string(),
        station: station.to_string(),
        start_time: start,
        end_time: end,
        is_live: true,
        is_live_wave: false,
        comment: String::new(),
    }
}

pub fn create_test_registry() -> Arc<LoggerRegistry> {
    Arc::new(LoggerRegistry::from_intervals(vec![
        interval("62091", "8704_CR6", utc(2022, 1, 1), Some(utc(2023, 7, 1))),
        interval("62091", "9100_CR6", utc(2023, 7, 1), None),
        interval("62092", "5120_CR6", utc(2021, 3, 1), None),
    ]))
}

pub fn create_test_config() -> QcConfig {
    QcConfig::default().with_workers(2)
}

pub fn create_test_processor(config: &QcConfig) -> StationQcProcessor {
    StationQcProcessor::new(
        create_test_registry(),
        Arc::new(ParameterLimits::builtin()),
        config,
    )
    .unwrap()
}

/// Observations every `step_hours` from `start`, with plausible values for
/// the four key parameters. Values vary slightly so no flat lines appear.
pub fn create_station_table(
    start: DateTime<Utc>,
    step_hours: i64,
    tags: &[&str],
) -> ObservationTable {
    let rows = tags.len();
    let timestamps = (0..rows)
        .map(|i| start + Duration::hours(i as i64 * step_hours))
        .collect();
    let wobble = |base: f64, i: usize| Some(base + (i % 3) as f64 * 0.1 + i as f64 * 0.01);

    ObservationTable::new(timestamps)
        .with_logger_tags(tags.iter().map(|t| t.to_string()).collect())
        .unwrap()
        .with_parameter(ParameterColumn::unchecked(
            "airpressure",
            (0..rows).map(|i| wobble(1012.0, i)).collect(),
        ))
        .unwrap()
        .with_parameter(ParameterColumn::unchecked(
            "airtemp",
            (0..rows).map(|i| wobble(11.0, i)).collect(),
        ))
        .unwrap()
        .with_parameter(ParameterColumn::unchecked(
            "windsp",
            (0..rows).map(|i| wobble(8.0, i)).collect(),
        ))
        .unwrap()
        .with_parameter(ParameterColumn::unchecked(
            "hm0",
            (0..rows).map(|i| wobble(2.0, i)).collect(),
        ))
        .unwrap()
}

pub fn indicator_codes(table: &ObservationTable, parameter: &str) -> Vec<u8> {
    table
        .parameter(parameter)
        .unwrap()
        .indicators()
        .iter()
        .map(|i| i.code())
        .collect()
}

pub fn record_codes(table: &ObservationTable) -> Vec<u8> {
    table.record_indicators().iter().map(|i| i.code()).collect()
}

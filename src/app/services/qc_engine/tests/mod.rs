//! Shared fixtures for QC engine tests

use crate::app::models::{Indicator, Limits, ObservationTable, ParameterColumn};
use crate::app::services::parameter_limits::ParameterLimits;
use crate::app::services::qc_engine::QcSample;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

pub mod engine_tests;

/// Samples with every indicator at 0
pub fn samples(values: &[f64]) -> Vec<QcSample> {
    values
        .iter()
        .map(|v| QcSample::new(Some(*v), Indicator::NotChecked))
        .collect()
}

pub fn codes(samples: &[QcSample]) -> Vec<u8> {
    samples.iter().map(|s| s.indicator.code()).collect()
}

pub fn indicator_codes(column: &ParameterColumn) -> Vec<u8> {
    column.indicators().iter().map(|i| i.code()).collect()
}

/// Hourly timestamps starting at midnight on 1 March 2024
pub fn hourly(count: usize) -> Vec<DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|hour| start + Duration::hours(hour as i64))
        .collect()
}

/// Single-parameter table with hourly timestamps and all indicators at 0
pub fn create_test_table(parameter: &str, values: &[Option<f64>]) -> ObservationTable {
    ObservationTable::new(hourly(values.len()))
        .with_parameter(ParameterColumn::unchecked(parameter, values.to_vec()))
        .unwrap()
}

pub fn create_test_limits() -> Arc<ParameterLimits> {
    Arc::new(
        ParameterLimits::builder()
            .default_limits("temp", Limits::full(-5.0, 40.0, 5.0))
            .default_limits("hm0", Limits::full(0.0, 15.0, 3.0))
            .station_limits("62091", "hm0", Limits::new(None, Some(18.0), None))
            .build(),
    )
}

//! Integration tests for the polars adapter
//!
//! Configuration and observations arrive as `DataFrame`s, the way a caller
//! reading CSV or Parquet would hand them over.

use buoy_qc::constants::DEFAULT_TIMESTAMP_FORMATS;
use buoy_qc::{
    Error, LoggerFilterOutcome, LoggerRegistry, ParameterLimits, QcConfig, StationQcProcessor,
};
use polars::prelude::*;
use std::sync::Arc;

fn create_registry_frame() -> DataFrame {
    df!(
        "Buoy" => &[62091i64, 62091],
        "Loggerid" => &["8704_CR6", "9100_CR6"],
        "Start" => &["01/01/2022 00:00", "01/07/2023 00:00"],
        "End" => &[Some("01/07/2023 00:00"), None],
        "Live" => &[1i64, 1],
        "Comment" => &["installed", "swap after service"],
    )
    .unwrap()
}

fn create_limits_frame() -> DataFrame {
    df!(
        "parameter" => &["airtemp", "hm0", "hm0"],
        "station" => &["default", "default", "62091"],
        "min_value" => &[Some(-20.0), Some(0.0), None],
        "max_value" => &[Some(40.0), Some(15.0), Some(18.0)],
        "spike_threshold" => &[Some(5.0), Some(3.0), None],
    )
    .unwrap()
}

fn create_observation_frame() -> DataFrame {
    df!(
        "time" => &[
            "2024-03-01 00:00",
            "2024-03-01 01:00",
            "2024-03-01 02:00",
            "2024-03-01 03:00",
            "2024-03-01 04:00",
            "2024-03-01 05:00",
        ],
        "loggerid" => &["9100_CR6", "9100_CR6", "old", "9100_CR6", "9100_CR6", "9100_CR6"],
        "airtemp" => &[8.0, 8.5, 30.0, 9.0, 30.0, 9.5],
        "ind_airtemp" => &[0i32, 0, 0, 0, 0, 0],
        "hm0" => &[Some(1.0), None, Some(1.0), Some(1.1), Some(1.2), Some(1.3)],
        "ind_hm0" => &[0i32, 0, 0, 0, 0, 9],
        "qc_ind" => &[0i32, 0, 0, 0, 0, 0],
    )
    .unwrap()
}

fn create_processor() -> StationQcProcessor {
    let (registry, registry_stats) =
        LoggerRegistry::from_dataframe(&create_registry_frame(), DEFAULT_TIMESTAMP_FORMATS).unwrap();
    assert_eq!(registry_stats.intervals_loaded, 2);

    let (limits, limits_stats) = ParameterLimits::from_dataframe(&create_limits_frame()).unwrap();
    assert_eq!(limits_stats.rows_loaded, 3);

    StationQcProcessor::new(Arc::new(registry), Arc::new(limits), &QcConfig::default()).unwrap()
}

fn i32_values(frame: &DataFrame, name: &str) -> Vec<Option<i32>> {
    frame
        .column(name)
        .unwrap()
        .as_materialized_series()
        .i32()
        .unwrap()
        .into_iter()
        .collect()
}

#[test]
fn test_frame_round_trip() {
    let processor = create_processor();
    let frame = create_observation_frame();

    let (annotated, result) = processor.process_frame("62091", "2024", &frame).unwrap();

    assert_eq!(
        result.filter_outcome,
        LoggerFilterOutcome::Applied {
            loggers: vec!["9100_CR6".to_string()],
            kept: 5,
            dropped: 1,
        }
    );
    assert_eq!(annotated.height(), 5);
    assert_eq!(annotated.width(), frame.width());

    // 30.0 jumps up and 9.5 jumps back down
    assert_eq!(
        i32_values(&annotated, "ind_airtemp"),
        vec![Some(1), Some(1), Some(1), Some(4), Some(4)]
    );
    // The null and the pre-flagged 1.3 are both missing
    assert_eq!(
        i32_values(&annotated, "ind_hm0"),
        vec![Some(1), Some(9), Some(1), Some(1), Some(9)]
    );
    assert_eq!(
        i32_values(&annotated, "qc_ind"),
        vec![Some(1), Some(1), Some(1), Some(0), Some(0)]
    );

    let loggers: Vec<Option<&str>> = annotated
        .column("loggerid")
        .unwrap()
        .as_materialized_series()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    assert!(loggers.iter().all(|tag| *tag == Some("9100_CR6")));
}

#[test]
fn test_unreadable_parameter_is_reported_not_fatal() {
    let processor = create_processor();
    let frame = df!(
        "time" => &["2024-03-01 00:00", "2024-03-01 01:00"],
        "loggerid" => &["9100_CR6", "9100_CR6"],
        "airtemp" => &["warm", "cold"],
        "ind_airtemp" => &[0i32, 0],
        "hm0" => &[1.0, 1.1],
        "ind_hm0" => &[0i32, 0],
    )
    .unwrap();

    let (annotated, result) = processor.process_frame("62091", "2024", &frame).unwrap();

    assert!(result.qc_report.has_failures());
    assert_eq!(result.qc_report.failures[0].parameter, "airtemp");
    assert_eq!(i32_values(&annotated, "ind_hm0"), vec![Some(1), Some(1)]);
    assert_eq!(i32_values(&annotated, "ind_airtemp"), vec![Some(0), Some(0)]);
}

#[test]
fn test_out_of_domain_record_indicator_fails_the_unit() {
    let processor = create_processor();
    let frame = df!(
        "time" => &["2024-03-01 00:00"],
        "hm0" => &[1.0],
        "ind_hm0" => &[0i32],
        "qc_ind" => &[3i32],
    )
    .unwrap();

    let result = processor.process_frame("62091", "2024", &frame);

    assert!(matches!(result, Err(Error::TableStructure { .. })));
}

#[test]
fn test_registry_frame_without_required_column() {
    let frame = create_registry_frame().drop("Live").unwrap();

    let result = LoggerRegistry::from_dataframe(&frame, DEFAULT_TIMESTAMP_FORMATS);

    assert!(matches!(result, Err(Error::LoggerRegistry { .. })));
}

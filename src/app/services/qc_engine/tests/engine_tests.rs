//! Tests for running QC over whole tables

use super::*;
use crate::app::services::qc_engine::{QcEngine, SkippedTest};
use crate::config::QcConfig;
use crate::Error;

#[test]
fn test_reference_sequence() {
    let engine = QcEngine::new(create_test_limits());
    let values: Vec<Option<f64>> = [10.0, 11.0, 50.0, 12.0, 13.0, 13.0, 13.0, 13.0, 13.0, 14.0]
        .iter()
        .map(|v| Some(*v))
        .collect();
    let mut table = create_test_table("temp", &values);

    let report = engine.apply(&mut table, "62091");

    assert_eq!(
        indicator_codes(table.parameter("temp").unwrap()),
        vec![1, 1, 4, 4, 4, 4, 4, 4, 4, 1]
    );

    let stats = report.parameter("temp").unwrap();
    assert_eq!(stats.total_values, 10);
    assert_eq!(stats.range_failures, 1);
    assert_eq!(stats.spike_failures, 2);
    assert_eq!(stats.flat_line_failures, 5);
    assert_eq!(stats.values_passed, 3);
    assert_eq!(stats.values_failed, 7);
    assert_eq!(stats.missing_values, 0);
    assert!(!report.has_failures());
    assert_eq!(report.issues().len(), 3);
}

#[test]
fn test_raw_values_are_never_modified() {
    let engine = QcEngine::new(create_test_limits());
    let values = vec![Some(1.0), Some(100.0), None, Some(f64::INFINITY)];
    let mut table = create_test_table("hm0", &values);

    engine.apply(&mut table, "62092");

    let column = table.parameter("hm0").unwrap();
    assert_eq!(column.values()[..3], values[..3]);
    assert!(column.values()[3].is_some_and(f64::is_infinite));
    assert_eq!(indicator_codes(column), vec![1, 4, 9, 9]);
}

#[test]
fn test_station_limits_override_defaults() {
    let engine = QcEngine::new(create_test_limits());
    let values = vec![Some(1.0), Some(6.0), Some(16.0)];

    let mut default_station = create_test_table("hm0", &values);
    engine.apply(&mut default_station, "62092");
    // Default hm0: max 15, spike 3
    assert_eq!(
        indicator_codes(default_station.parameter("hm0").unwrap()),
        vec![1, 4, 4]
    );

    let mut override_station = create_test_table("hm0", &values);
    let report = engine.apply(&mut override_station, "62091");
    // 62091 raises max to 18 and keeps the default spike threshold
    assert_eq!(
        indicator_codes(override_station.parameter("hm0").unwrap()),
        vec![1, 4, 4]
    );
    assert_eq!(report.parameter("hm0").unwrap().range_failures, 0);
    assert_eq!(
        report.parameter("hm0").unwrap().limits,
        Limits::new(Some(0.0), Some(18.0), Some(3.0))
    );
}

#[test]
fn test_parameter_without_limits_still_gets_flat_line_and_promotion() {
    let engine = QcEngine::new(create_test_limits());
    let values: Vec<Option<f64>> = vec![Some(-500.0), Some(3.0), Some(3.0), Some(3.0), Some(3.0), Some(3.0), Some(900.0)];
    let mut table = create_test_table("salinity", &values);

    let report = engine.apply(&mut table, "62091");

    assert_eq!(
        indicator_codes(table.parameter("salinity").unwrap()),
        vec![1, 4, 4, 4, 4, 4, 1]
    );
    let stats = report.parameter("salinity").unwrap();
    assert!(stats.was_skipped(SkippedTest::Range));
    assert!(stats.was_skipped(SkippedTest::Spike));
}

#[test]
fn test_timestamp_order_drives_spike_and_flat_line() {
    let engine = QcEngine::new(create_test_limits());
    let timestamps = hourly(4);
    // Rows out of time order: row 0 is the latest observation
    let table_times = vec![timestamps[3], timestamps[0], timestamps[1], timestamps[2]];
    let mut table = ObservationTable::new(table_times)
        .with_parameter(ParameterColumn::unchecked(
            "temp",
            vec![Some(30.0), Some(10.0), Some(11.0), Some(12.0)],
        ))
        .unwrap();

    engine.apply(&mut table, "62091");

    // In time order 10, 11, 12, 30: only the 30 jumps
    assert_eq!(indicator_codes(table.parameter("temp").unwrap()), vec![4, 1, 1, 1]);
    assert_eq!(table.timestamps()[0], timestamps[3]);
}

#[test]
fn test_existing_codes_are_respected() {
    let engine = QcEngine::new(create_test_limits());
    let column = ParameterColumn::new(
        "temp",
        vec![Some(10.0), Some(10.5), Some(11.0), Some(11.5)],
        vec![
            Indicator::Adjusted,
            Indicator::Failed,
            Indicator::GoodSensorSpecific,
            Indicator::Missing,
        ],
    )
    .unwrap();
    let mut table = ObservationTable::new(hourly(4)).with_parameter(column).unwrap();

    let report = engine.apply(&mut table, "62091");

    assert_eq!(indicator_codes(table.parameter("temp").unwrap()), vec![5, 4, 6, 9]);
    assert_eq!(report.parameter("temp").unwrap().values_passed, 0);
}

#[test]
fn test_rejected_parameters_reported_without_stopping_others() {
    let engine = QcEngine::new(create_test_limits());
    let mut table = create_test_table("temp", &[Some(10.0), Some(11.0)]);
    table.reject_parameter("hm0", "indicator code 3 outside domain");

    let report = engine.apply(&mut table, "62091");

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].parameter, "hm0");
    assert_eq!(indicator_codes(table.parameter("temp").unwrap()), vec![1, 1]);
}

#[test]
fn test_parameter_restriction() {
    let engine = QcEngine::new(create_test_limits()).with_parameters(Some(vec!["hm0".to_string()]));
    let mut table = create_test_table("temp", &[Some(10.0), Some(100.0)])
        .with_parameter(ParameterColumn::unchecked("hm0", vec![Some(1.0), Some(2.0)]))
        .unwrap();

    let report = engine.apply(&mut table, "62092");

    assert_eq!(report.parameters.len(), 1);
    assert_eq!(indicator_codes(table.parameter("temp").unwrap()), vec![0, 0]);
    assert_eq!(indicator_codes(table.parameter("hm0").unwrap()), vec![1, 1]);
}

#[test]
fn test_evaluate_parameter_rejects_inconsistent_order() {
    let engine = QcEngine::new(create_test_limits());
    let mut column = ParameterColumn::unchecked("temp", vec![Some(1.0), Some(2.0)]);

    let result = engine.evaluate_parameter(&mut column, &[0, 1, 2], Limits::default());
    assert!(result.is_err());
    assert_eq!(indicator_codes(&column), vec![0, 0]);
}

#[test]
fn test_config_flat_line_window() {
    let config = QcConfig::default().with_flat_line_window(3);
    let engine = QcEngine::from_config(create_test_limits(), &config).unwrap();
    let mut table = create_test_table("temp", &[Some(1.0), Some(2.0), Some(2.0), Some(2.0)]);

    let report = engine.apply(&mut table, "62091");

    assert_eq!(indicator_codes(table.parameter("temp").unwrap()), vec![1, 4, 4, 4]);
    assert_eq!(
        report.parameter("temp").unwrap().issues(),
        vec!["temp: 3 flat line values (3+ consecutive identical)".to_string()]
    );
}

#[test]
fn test_flat_line_window_below_two_is_rejected() {
    for window in [0, 1] {
        let result = QcEngine::new(create_test_limits()).with_flat_line_window(window);
        assert!(matches!(result, Err(Error::Configuration { .. })));

        let config = QcConfig::default().with_flat_line_window(window);
        assert!(QcEngine::from_config(create_test_limits(), &config).is_err());
    }

    let engine = QcEngine::new(create_test_limits())
        .with_flat_line_window(2)
        .unwrap();
    let mut table = create_test_table("temp", &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
    engine.apply(&mut table, "62091");
    assert_eq!(indicator_codes(table.parameter("temp").unwrap()), vec![1, 1, 1, 1]);
}

#[test]
fn test_absent_values_promoted_without_missing_reclassification() {
    let values = [Some(1.0), None, Some(f64::NAN), Some(2.0)];

    let mut reclassified = create_test_table("temp", &values);
    QcEngine::new(create_test_limits()).apply(&mut reclassified, "62091");
    assert_eq!(indicator_codes(reclassified.parameter("temp").unwrap()), vec![1, 9, 9, 1]);

    let config = QcConfig::default().without_missing_reclassification();
    let engine = QcEngine::from_config(create_test_limits(), &config).unwrap();
    let mut promoted = create_test_table("temp", &values);
    let report = engine.apply(&mut promoted, "62091");

    assert_eq!(indicator_codes(promoted.parameter("temp").unwrap()), vec![1, 1, 1, 1]);
    let stats = report.parameter("temp").unwrap();
    assert_eq!(stats.reclassified_missing, 0);
    assert_eq!(stats.missing_values, 0);
    assert_eq!(stats.spike_failures, 0);
}

#[test]
fn test_empty_table() {
    let engine = QcEngine::new(create_test_limits());
    let mut table = create_test_table("temp", &[]);

    let report = engine.apply(&mut table, "62091");

    assert_eq!(report.total_records, 0);
    assert_eq!(report.parameter("temp").unwrap().total_values, 0);
}

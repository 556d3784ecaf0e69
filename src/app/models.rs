//! Data models for buoy QC
//!
//! This module contains the core data structures: the QC indicator domain,
//! logger activity intervals from the station log of loggers, and the QC
//! limit records used by the test pipeline. The observation table lives in
//! [`table`].

use crate::constants::{self, LOGGER_ID_SEPARATOR, indicator_codes};
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod table;

pub use table::{ObservationTable, ParameterColumn, RejectedParameter};

// =============================================================================
// Indicator Enumeration
// =============================================================================

/// QC indicator attached to every observation of every parameter, and to
/// each record as a whole.
///
/// The domain is closed: any code outside {0, 1, 4, 5, 6, 9} is rejected
/// when converting from raw values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Indicator {
    /// No QC performed yet
    #[default]
    NotChecked = indicator_codes::NOT_CHECKED,

    /// QC performed, data OK
    Good = indicator_codes::GOOD,

    /// QC performed, raw data not OK and not adjusted
    Failed = indicator_codes::FAILED,

    /// QC performed, raw data not OK but value adjusted
    Adjusted = indicator_codes::ADJUSTED,

    /// QC performed, data OK (sensor-specific variant)
    GoodSensorSpecific = indicator_codes::GOOD_SENSOR_SPECIFIC,

    /// Data missing
    Missing = indicator_codes::MISSING,
}

impl Indicator {
    /// Numeric code as stored in `ind_*` and `qc_ind` columns
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Get human-readable description of this indicator
    pub fn description(self) -> &'static str {
        constants::indicator_description(self.code())
    }

    pub fn is_missing(self) -> bool {
        self == Indicator::Missing
    }

    pub fn is_failed(self) -> bool {
        self == Indicator::Failed
    }

    /// Passed QC or legitimately missing; the condition key parameters must
    /// meet for a record to be promoted
    pub fn is_good_or_missing(self) -> bool {
        matches!(self, Indicator::Good | Indicator::Missing)
    }

    /// Get all possible indicator values
    pub fn all_values() -> [Indicator; 6] {
        [
            Indicator::NotChecked,
            Indicator::Good,
            Indicator::Failed,
            Indicator::Adjusted,
            Indicator::GoodSensorSpecific,
            Indicator::Missing,
        ]
    }
}

impl TryFrom<i32> for Indicator {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        u8::try_from(value)
            .ok()
            .and_then(|code| {
                Indicator::all_values()
                    .into_iter()
                    .find(|indicator| indicator.code() == code)
            })
            .ok_or_else(|| {
                Error::table_structure(format!(
                    "Invalid indicator value {}: must be one of 0, 1, 4, 5, 6, 9",
                    value
                ))
            })
    }
}

impl FromStr for Indicator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let code: i32 = s.trim().parse().map_err(|_| {
            Error::table_structure(format!("Invalid indicator value '{}': not an integer", s))
        })?;
        Indicator::try_from(code)
    }
}

impl From<Indicator> for i32 {
    fn from(indicator: Indicator) -> Self {
        indicator.code() as i32
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

// =============================================================================
// Logger Interval
// =============================================================================

/// One row of a station's log of loggers: a hardware logger installed over
/// a period, and whether it was the recording authority during that span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerInterval {
    /// Composite logger identifier, e.g. "8704_CR6"
    pub logger_id: String,

    /// Station the logger was installed on
    pub station: String,

    pub start_time: DateTime<Utc>,

    /// `None` while the logger is still active
    pub end_time: Option<DateTime<Utc>>,

    /// Logger is the power/recording authority during this span
    pub is_live: bool,

    /// Logger is the authority for the wave sensor stream
    pub is_live_wave: bool,

    pub comment: String,
}

impl LoggerInterval {
    /// Token used to match observation logger tags: the part of the logger
    /// id before the first separator ("8704" for "8704_CR6"). A tag matches
    /// when it contains the token, whatever suffix it carries.
    pub fn token(&self) -> &str {
        self.logger_id
            .split(LOGGER_ID_SEPARATOR)
            .next()
            .unwrap_or(&self.logger_id)
    }

    /// Check if the interval covers an instant (inclusive at both ends)
    pub fn is_active_at(&self, at_time: DateTime<Utc>) -> bool {
        at_time >= self.start_time && self.end_time.is_none_or(|end| at_time <= end)
    }

    /// Positive overlap between this interval and `[window_start, window_end]`.
    ///
    /// An open-ended interval is treated as extending to `window_end`.
    pub fn overlap(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Option<Duration> {
        let interval_end = self.end_time.unwrap_or(window_end);
        let overlap_start = window_start.max(self.start_time);
        let overlap_end = window_end.min(interval_end);

        (overlap_start < overlap_end).then(|| overlap_end - overlap_start)
    }

    /// Fraction of the window covered by this interval, in `[0, 1]`
    pub fn coverage(&self, window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> f64 {
        if window_end <= window_start {
            return 0.0;
        }
        let window = seconds(window_end - window_start);

        self.overlap(window_start, window_end)
            .map(|overlap| seconds(overlap) / window)
            .unwrap_or(0.0)
    }

    /// Active period formatted as "YYYY-MM-DD to YYYY-MM-DD" or "... to Present"
    pub fn period_label(&self) -> String {
        let end = self
            .end_time
            .map(|end| end.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "Present".to_string());
        format!("{} to {}", self.start_time.format("%Y-%m-%d"), end)
    }
}

/// Non-negative duration in fractional seconds; negative spans count as zero
fn seconds(duration: Duration) -> f64 {
    duration
        .to_std()
        .map(|duration| duration.as_secs_f64())
        .unwrap_or(0.0)
}

// =============================================================================
// QC Limits
// =============================================================================

/// Thresholds for one parameter. An absent field disables the test that
/// needs it; it never means "passes".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spike_threshold: Option<f64>,
}

impl Limits {
    pub fn new(min_value: Option<f64>, max_value: Option<f64>, spike_threshold: Option<f64>) -> Self {
        Self {
            min_value,
            max_value,
            spike_threshold,
        }
    }

    /// Range and spike limits, the shape most defaults take
    pub fn full(min_value: f64, max_value: f64, spike_threshold: f64) -> Self {
        Self::new(Some(min_value), Some(max_value), Some(spike_threshold))
    }

    /// Merge field by field: fields set on `self` win, others come from `fallback`
    pub fn merged_over(&self, fallback: &Limits) -> Limits {
        Limits {
            min_value: self.min_value.or(fallback.min_value),
            max_value: self.max_value.or(fallback.max_value),
            spike_threshold: self.spike_threshold.or(fallback.spike_threshold),
        }
    }

    /// True when at least one range bound is configured
    pub fn has_range(&self) -> bool {
        self.min_value.is_some() || self.max_value.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_range() && self.spike_threshold.is_none()
    }

    /// Check internal consistency: finite values, min <= max, spike >= 0
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_value", self.min_value),
            ("max_value", self.max_value),
            ("spike_threshold", self.spike_threshold),
        ] {
            if let Some(v) = value.filter(|v| !v.is_finite()) {
                return Err(Error::parameter_limits(format!(
                    "{} must be finite, got {}",
                    name, v
                )));
            }
        }

        if let (Some(min), Some(max)) = (self.min_value, self.max_value) {
            if min > max {
                return Err(Error::parameter_limits(format!(
                    "min_value {} is greater than max_value {}",
                    min, max
                )));
            }
        }

        if let Some(spike) = self.spike_threshold.filter(|spike| *spike < 0.0) {
            return Err(Error::parameter_limits(format!(
                "spike_threshold {} must not be negative",
                spike
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    fn create_test_interval(end: Option<DateTime<Utc>>) -> LoggerInterval {
        LoggerInterval {
            logger_id: "8704_CR6".to_string(),
            station: "62091".to_string(),
            start_time: utc(2023, 1, 1),
            end_time: end,
            is_live: true,
            is_live_wave: false,
            comment: String::new(),
        }
    }

    mod indicator_tests {
        use super::*;

        #[test]
        fn test_indicator_codes_round_trip_through_i32() {
            for indicator in Indicator::all_values() {
                let code: i32 = indicator.into();
                assert_eq!(Indicator::try_from(code).unwrap(), indicator);
            }
        }

        #[test]
        fn test_indicator_rejects_codes_outside_domain() {
            for code in [2, 3, 7, 8, 10, -1, 256] {
                assert!(Indicator::try_from(code).is_err(), "code {code} accepted");
            }
        }

        #[test]
        fn test_indicator_from_str() {
            assert_eq!("4".parse::<Indicator>().unwrap(), Indicator::Failed);
            assert_eq!(" 9 ".parse::<Indicator>().unwrap(), Indicator::Missing);
            assert!("x".parse::<Indicator>().is_err());
            assert!("3".parse::<Indicator>().is_err());
        }

        #[test]
        fn test_good_or_missing() {
            assert!(Indicator::Good.is_good_or_missing());
            assert!(Indicator::Missing.is_good_or_missing());
            assert!(!Indicator::GoodSensorSpecific.is_good_or_missing());
            assert!(!Indicator::NotChecked.is_good_or_missing());
            assert!(!Indicator::Failed.is_good_or_missing());
        }

        #[test]
        fn test_default_is_not_checked() {
            assert_eq!(Indicator::default(), Indicator::NotChecked);
            assert_eq!(Indicator::Adjusted.to_string(), "5");
        }
    }

    mod interval_tests {
        use super::*;

        #[test]
        fn test_token_strips_hardware_suffix() {
            let interval = create_test_interval(None);
            assert_eq!(interval.token(), "8704");

            let mut plain = create_test_interval(None);
            plain.logger_id = "9001".to_string();
            assert_eq!(plain.token(), "9001");
        }

        #[test]
        fn test_open_ended_interval_extends_to_window_end() {
            let interval = create_test_interval(None);
            let overlap = interval.overlap(utc(2023, 6, 1), utc(2023, 7, 1)).unwrap();
            assert_eq!(overlap, Duration::days(30));
            assert_eq!(interval.coverage(utc(2023, 6, 1), utc(2023, 7, 1)), 1.0);
        }

        #[test]
        fn test_partial_coverage() {
            let interval = create_test_interval(Some(utc(2023, 1, 11)));
            let coverage = interval.coverage(utc(2023, 1, 1), utc(2023, 1, 21));
            assert!((coverage - 0.5).abs() < 1e-12);
        }

        #[test]
        fn test_no_overlap_outside_interval() {
            let interval = create_test_interval(Some(utc(2023, 2, 1)));
            assert!(interval.overlap(utc(2023, 3, 1), utc(2023, 4, 1)).is_none());
            // Touching at a single instant is not a positive overlap
            assert!(interval.overlap(utc(2023, 2, 1), utc(2023, 3, 1)).is_none());
            assert_eq!(interval.coverage(utc(2023, 3, 1), utc(2023, 4, 1)), 0.0);
        }

        #[test]
        fn test_degenerate_window_has_zero_coverage() {
            let interval = create_test_interval(None);
            assert_eq!(interval.coverage(utc(2023, 5, 1), utc(2023, 5, 1)), 0.0);
            assert_eq!(interval.coverage(utc(2023, 5, 2), utc(2023, 5, 1)), 0.0);
        }

        #[test]
        fn test_is_active_at_is_inclusive() {
            let interval = create_test_interval(Some(utc(2023, 2, 1)));
            assert!(interval.is_active_at(utc(2023, 1, 1)));
            assert!(interval.is_active_at(utc(2023, 2, 1)));
            assert!(!interval.is_active_at(utc(2023, 2, 2)));
            assert!(!interval.is_active_at(utc(2022, 12, 31)));
        }

        #[test]
        fn test_period_label() {
            assert_eq!(
                create_test_interval(None).period_label(),
                "2023-01-01 to Present"
            );
            assert_eq!(
                create_test_interval(Some(utc(2024, 3, 5))).period_label(),
                "2023-01-01 to 2024-03-05"
            );
        }
    }

    mod limits_tests {
        use super::*;

        #[test]
        fn test_merge_prefers_own_fields() {
            let station = Limits::new(None, Some(18.0), Some(4.0));
            let default = Limits::full(0.0, 15.0, 3.0);
            assert_eq!(station.merged_over(&default), Limits::full(0.0, 18.0, 4.0));
        }

        #[test]
        fn test_merge_keeps_absent_fields_absent() {
            let station = Limits::new(Some(1.0), None, None);
            let merged = station.merged_over(&Limits::default());
            assert_eq!(merged, Limits::new(Some(1.0), None, None));
            assert!(merged.has_range());
            assert!(!merged.is_empty());
        }

        #[test]
        fn test_validate_rejects_inverted_range() {
            assert!(Limits::full(10.0, 0.0, 1.0).validate().is_err());
            assert!(Limits::new(None, None, Some(-1.0)).validate().is_err());
            assert!(Limits::new(Some(f64::NAN), None, None).validate().is_err());
            assert!(Limits::full(0.0, 10.0, 1.0).validate().is_ok());
        }
    }
}

//! Fallback QC limits
//!
//! Used when the caller has no limits table. Defaults cover the standard
//! buoy parameters; the station entries tighten or widen them for the five
//! Irish Marine Data Buoy Observation Network stations (62091 to 62095).

use super::ParameterLimits;
use crate::app::models::Limits;
use crate::constants::DEFAULT_STATION;
use tracing::debug;

/// (parameter, min, max, spike threshold)
type LimitEntry = (&'static str, f64, f64, f64);

const DEFAULT_LIMITS: &[LimitEntry] = &[
    ("airpressure", 950.0, 1050.0, 10.0),
    ("airtemp", -20.0, 40.0, 5.0),
    ("humidity", 0.0, 100.0, 20.0),
    ("seatemp_16", -2.0, 30.0, 3.0),
    ("seatemp_aa", -2.0, 30.0, 3.0),
    ("windsp", 0.0, 50.0, 15.0),
    ("windgust", 0.0, 60.0, 20.0),
    ("winddir", 0.0, 360.0, 180.0),
    ("hm0", 0.0, 15.0, 3.0),
    ("hmax", 0.0, 25.0, 5.0),
    ("tp", 1.0, 25.0, 10.0),
    ("mdir", 0.0, 360.0, 180.0),
    ("salinity_16", 20.0, 40.0, 5.0),
];

const STATION_LIMITS: &[(&str, &[LimitEntry])] = &[
    (
        "62091",
        &[
            ("hm0", 0.0, 18.0, 4.0),
            ("hmax", 0.0, 30.0, 6.0),
            ("windsp", 0.0, 60.0, 20.0),
            ("windgust", 0.0, 80.0, 25.0),
            ("seatemp_aa", 4.0, 18.0, 2.0),
        ],
    ),
    (
        "62092",
        &[
            ("hm0", 0.0, 12.0, 2.5),
            ("hmax", 0.0, 20.0, 4.0),
            ("seatemp_aa", 6.0, 20.0, 2.5),
            ("salinity_16", 25.0, 35.0, 3.0),
        ],
    ),
    (
        "62093",
        &[
            ("hm0", 0.0, 15.0, 3.5),
            ("hmax", 0.0, 25.0, 5.0),
            ("seatemp_aa", 5.0, 19.0, 2.5),
        ],
    ),
    (
        "62094",
        &[
            ("hm0", 0.0, 16.0, 3.5),
            ("hmax", 0.0, 26.0, 5.5),
            ("windsp", 0.0, 55.0, 18.0),
            ("seatemp_aa", 4.5, 18.5, 2.5),
        ],
    ),
    (
        "62095",
        &[
            ("airtemp", -15.0, 35.0, 4.0),
            ("hm0", 0.0, 14.0, 3.0),
            ("hmax", 0.0, 22.0, 4.5),
            ("seatemp_aa", 6.0, 19.0, 2.0),
        ],
    ),
];

impl ParameterLimits {
    /// The fallback limits table
    pub fn builtin() -> Self {
        let mut limits = Self::new();

        for &(parameter, min, max, spike) in DEFAULT_LIMITS {
            limits.insert(DEFAULT_STATION, parameter, Limits::full(min, max, spike));
        }
        for &(station, entries) in STATION_LIMITS {
            for &(parameter, min, max, spike) in entries {
                limits.insert(station, parameter, Limits::full(min, max, spike));
            }
        }

        debug!(
            "Built fallback QC limits: {} entries over {} parameters",
            limits.entry_count(),
            limits.parameters().len()
        );
        limits
    }
}

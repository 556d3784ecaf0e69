//! Application constants for buoy QC
//!
//! Indicator codes, column naming conventions, resolver thresholds and
//! default values shared across the crate.

// =============================================================================
// Indicator Codes
// =============================================================================

/// Indicator values used for every per-parameter and record-level QC column
pub mod indicator_codes {
    /// No QC performed yet
    pub const NOT_CHECKED: u8 = 0;

    /// QC performed, data OK
    pub const GOOD: u8 = 1;

    /// QC performed, raw data not OK and not adjusted
    pub const FAILED: u8 = 4;

    /// QC performed, raw data not OK but value adjusted/interpolated
    pub const ADJUSTED: u8 = 5;

    /// QC performed, data OK (sensor-specific variant, e.g. Datawell Hmax)
    pub const GOOD_SENSOR_SPECIFIC: u8 = 6;

    /// Data missing
    pub const MISSING: u8 = 9;

    /// The closed indicator domain
    pub const ALL: &[u8] = &[
        NOT_CHECKED,
        GOOD,
        FAILED,
        ADJUSTED,
        GOOD_SENSOR_SPECIFIC,
        MISSING,
    ];
}

// =============================================================================
// Logger Resolution
// =============================================================================

/// Separator between the numeric logger token and the hardware suffix ("8704_CR6")
pub const LOGGER_ID_SEPARATOR: char = '_';

/// Coverage fraction a logger must exceed to be named the majority logger
pub const MAJORITY_COVERAGE_THRESHOLD: f64 = 0.5;

/// Accepted timestamp formats for logger interval rows, tried in order
pub const DEFAULT_TIMESTAMP_FORMATS: &[&str] =
    &["%d/%m/%Y %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Generic datetime forms tried after the configured formats
pub const FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Date-only forms tried last (interpreted as midnight UTC)
pub const FALLBACK_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

// =============================================================================
// Quality Control
// =============================================================================

/// Station identifier that marks a limits row as the default for all stations
pub const DEFAULT_STATION: &str = "default";

/// Number of consecutive identical values that constitutes a flat line
pub const FLAT_LINE_WINDOW: usize = 5;

/// Smallest usable flat-line window; a run of one is not a flat line
pub const MIN_FLAT_LINE_WINDOW: usize = 2;

/// Key parameters whose joint status sets the record-level indicator
pub const DEFAULT_KEY_PARAMETERS: &[&str] = &["airpressure", "airtemp", "windsp", "hm0"];

/// Missing share (percent) above which a parameter's sensor is suspect
pub const MISSING_DATA_CONCERN_PERCENT: f64 = 50.0;

/// Share of range plus spike failures above which a parameter is suspect
pub const FAILURE_RATE_CONCERN_FRACTION: f64 = 0.1;

// =============================================================================
// Column Name Constants
// =============================================================================

/// Standard column names in buoy observation and configuration tables
pub mod columns {
    // Observation table
    pub const TIME: &str = "time";
    pub const LOGGER_ID: &str = "loggerid";
    pub const RECORD_INDICATOR: &str = "qc_ind";

    // Logger interval table
    pub const LOGGER_STATION: &str = "Buoy";
    pub const LOGGER_LOGGER_ID: &str = "Loggerid";
    pub const LOGGER_START: &str = "Start";
    pub const LOGGER_END: &str = "End";
    pub const LOGGER_LIVE: &str = "Live";
    pub const LOGGER_LIVE_WAVE: &str = "Live_wave";
    pub const LOGGER_COMMENT: &str = "Comment";

    // Parameter limits table
    pub const LIMIT_PARAMETER: &str = "parameter";
    pub const LIMIT_STATION: &str = "station";
    pub const LIMIT_MIN: &str = "min_value";
    pub const LIMIT_MAX: &str = "max_value";
    pub const LIMIT_SPIKE: &str = "spike_threshold";
    pub const LIMIT_NOTES: &str = "notes";
}

/// Prefix of per-parameter indicator columns
pub const INDICATOR_PREFIX: &str = "ind_";

// =============================================================================
// Helper Functions
// =============================================================================

/// Get indicator description for human-readable output
pub fn indicator_description(code: u8) -> &'static str {
    match code {
        indicator_codes::NOT_CHECKED => "No QC performed yet",
        indicator_codes::GOOD => "QC performed, data OK",
        indicator_codes::FAILED => "QC performed, data not OK and not adjusted",
        indicator_codes::ADJUSTED => "QC performed, data not OK but value adjusted",
        indicator_codes::GOOD_SENSOR_SPECIFIC => "QC performed, data OK (sensor specific)",
        indicator_codes::MISSING => "Data missing",
        _ => "Unknown indicator",
    }
}

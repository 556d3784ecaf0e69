//! Logger registry loading statistics
//!
//! Tracks how many log-of-loggers rows were read, kept and discarded so the
//! caller can report on configuration quality.

/// Statistics about the logger registry loading process
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    /// Number of rows offered to the loader
    pub rows_seen: usize,

    /// Number of intervals kept
    pub intervals_loaded: usize,

    /// Number of kept intervals flagged live
    pub live_intervals: usize,

    /// Number of rows discarded (unparseable or inconsistent)
    pub rows_discarded: usize,

    /// Number of distinct stations in the registry
    pub stations: usize,

    /// Time taken to load the registry
    pub load_duration: std::time::Duration,

    /// Reasons for every discarded row
    pub errors: Vec<String>,
}

impl LoadStats {
    /// Create new empty load statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Percentage of rows discarded
    pub fn discard_rate(&self) -> f64 {
        if self.rows_seen == 0 {
            0.0
        } else {
            (self.rows_discarded as f64 / self.rows_seen as f64) * 100.0
        }
    }

    /// Check if any rows were discarded
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get a summary string of the loading process
    pub fn summary(&self) -> String {
        format!(
            "Loaded {} logger intervals ({} live) for {} stations from {} rows ({:.1}% discarded) in {:.2}s",
            self.intervals_loaded,
            self.live_intervals,
            self.stations,
            self.rows_seen,
            self.discard_rate(),
            self.load_duration.as_secs_f64()
        )
    }
}

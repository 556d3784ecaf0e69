//! Logger registry: which hardware logger recorded for a station, and when
//!
//! The registry is built once from the station log of loggers and is
//! immutable afterwards. Intervals are grouped by station and kept in
//! ascending start time; intervals that share a start time keep the order
//! in which they were registered, which is what resolution tie-breaks on.
//!
//! # Components
//!
//! - [`parser`] - Timestamp/flag parsing and row validation
//! - [`loader`] - Building the registry from rows or a polars `DataFrame`
//! - [`resolver`] - Authoritative logger resolution over time windows
//! - [`filter`] - Restricting an observation table to the resolved loggers

use crate::app::models::LoggerInterval;
use std::collections::HashMap;
use tracing::info;

pub mod filter;
pub mod loader;
pub mod metadata;
pub mod parser;
pub mod resolver;

#[cfg(test)]
pub mod tests;

pub use filter::{LoggerFilterOutcome, LoggerMatcher, filter_by_live_loggers};
pub use metadata::LoadStats;
pub use parser::{LoggerIntervalRow, parse_flag, parse_timestamp};
pub use resolver::{LoggerResolver, ResolvedLogger};

/// Immutable collection of logger activity intervals per station
#[derive(Debug, Clone, Default)]
pub struct LoggerRegistry {
    /// Intervals per station, ordered by start time
    pub(crate) stations: HashMap<String, Vec<LoggerInterval>>,
}

impl LoggerRegistry {
    /// Create an empty registry; every resolution against it returns none
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from already-validated intervals
    pub fn from_intervals(intervals: impl IntoIterator<Item = LoggerInterval>) -> Self {
        let mut stations: HashMap<String, Vec<LoggerInterval>> = HashMap::new();
        for interval in intervals {
            stations
                .entry(interval.station.clone())
                .or_default()
                .push(interval);
        }

        // Stable sort keeps registration order for equal start times
        for intervals in stations.values_mut() {
            intervals.sort_by_key(|interval| interval.start_time);
        }

        Self { stations }
    }

    /// All intervals for a station in start-time order
    pub fn intervals(&self, station: &str) -> &[LoggerInterval] {
        self.stations
            .get(station)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Live intervals for a station in start-time order
    pub fn live_intervals<'a>(
        &'a self,
        station: &str,
    ) -> impl Iterator<Item = &'a LoggerInterval> + 'a {
        self.intervals(station)
            .iter()
            .filter(|interval| interval.is_live)
    }

    /// Check if the registry holds any interval for a station
    pub fn contains_station(&self, station: &str) -> bool {
        self.stations.contains_key(station)
    }

    /// Station identifiers in sorted order
    pub fn station_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.stations.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn interval_count(&self) -> usize {
        self.stations.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Log the live loggers known for every station
    pub fn log_summary(&self) {
        if self.is_empty() {
            info!("No logger information available, logger filtering disabled");
            return;
        }

        for station in self.station_ids() {
            let live: Vec<&LoggerInterval> = self.live_intervals(station).collect();
            info!("Station {}: {} live loggers", station, live.len());
            for interval in live {
                info!("  {}: {}", interval.logger_id, interval.period_label());
            }
        }
    }
}

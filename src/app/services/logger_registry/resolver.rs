//! Authoritative logger resolution
//!
//! Given a station and a time window, decides which live logger(s) the
//! observations should come from by comparing how much of the window each
//! live interval covers. Stations unknown to the registry, degenerate
//! windows and windows with no live coverage all resolve to none; callers
//! treat that as "skip logger filtering", never as an error.

use super::LoggerRegistry;
use crate::app::models::LoggerInterval;
use crate::constants::MAJORITY_COVERAGE_THRESHOLD;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// A live interval together with the fraction of the query window it covers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLogger<'a> {
    pub interval: &'a LoggerInterval,

    /// Overlap duration divided by window duration, in `(0, 1]`
    pub coverage: f64,
}

/// Resolves authoritative loggers against a shared registry
#[derive(Debug, Clone)]
pub struct LoggerResolver {
    registry: Arc<LoggerRegistry>,
}

impl LoggerResolver {
    pub fn new(registry: Arc<LoggerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &LoggerRegistry {
        &self.registry
    }

    /// Every live interval with positive overlap, in start-time order
    pub fn resolve_all(
        &self,
        station: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Vec<ResolvedLogger<'_>> {
        if window_end <= window_start {
            debug!(
                "Degenerate window {} to {} for station {}, nothing to resolve",
                window_start, window_end, station
            );
            return Vec::new();
        }

        self.registry
            .live_intervals(station)
            .filter_map(|interval| {
                interval.overlap(window_start, window_end)?;
                let coverage = interval.coverage(window_start, window_end);
                (coverage > 0.0).then_some(ResolvedLogger { interval, coverage })
            })
            .collect()
    }

    /// The live interval covering the largest fraction of the window.
    ///
    /// Ties go to the interval that starts first; intervals with the same
    /// start keep registration order.
    pub fn resolve_best(
        &self,
        station: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Option<ResolvedLogger<'_>> {
        self.resolve_all(station, window_start, window_end)
            .into_iter()
            .fold(None, |best: Option<ResolvedLogger<'_>>, candidate| match best {
                Some(current) if current.coverage >= candidate.coverage => Some(current),
                _ => Some(candidate),
            })
    }

    /// The best live interval, only if it covers more than half the window.
    ///
    /// Used where a single authoritative logger has to be named, such as a
    /// report header.
    pub fn resolve_majority(
        &self,
        station: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Option<ResolvedLogger<'_>> {
        self.resolve_best(station, window_start, window_end)
            .filter(|best| best.coverage > MAJORITY_COVERAGE_THRESHOLD)
    }

    /// The first live interval (in start-time order) active at an instant
    pub fn resolve_at(&self, station: &str, at_time: DateTime<Utc>) -> Option<&LoggerInterval> {
        self.registry
            .live_intervals(station)
            .find(|interval| interval.is_active_at(at_time))
    }
}

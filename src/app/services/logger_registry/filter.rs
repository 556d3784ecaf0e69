//! Restricting observation tables to live logger data
//!
//! Observation rows carry a free-form logger tag. A row belongs to a
//! resolved logger when its tag contains the logger's match token (the part
//! of the logger id before the first `_`), so "8704_CR6_rev2" and "8704"
//! both belong to logger 8704_CR6.

use super::resolver::LoggerResolver;
use crate::app::models::{LoggerInterval, ObservationTable};
use crate::{Error, Result};
use regex::Regex;
use tracing::{info, warn};

/// Compiled token matcher for a set of resolved loggers
#[derive(Debug, Clone)]
pub struct LoggerMatcher {
    tokens: Vec<String>,
    pattern: Regex,
}

impl LoggerMatcher {
    /// Build a matcher from resolved intervals.
    ///
    /// Returns `Ok(None)` when the intervals yield no tokens.
    pub fn from_intervals<'a>(
        intervals: impl IntoIterator<Item = &'a LoggerInterval>,
    ) -> Result<Option<Self>> {
        let mut tokens: Vec<String> = Vec::new();
        for interval in intervals {
            let token = interval.token();
            if !token.is_empty() && !tokens.iter().any(|t| t == token) {
                tokens.push(token.to_string());
            }
        }

        if tokens.is_empty() {
            return Ok(None);
        }

        let alternation = tokens
            .iter()
            .map(|token| regex::escape(token))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&alternation).map_err(|e| {
            Error::logger_registry(format!("Cannot compile logger pattern: {}", e))
        })?;

        Ok(Some(Self { tokens, pattern }))
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// True when the tag contains at least one token
    pub fn matches(&self, tag: &str) -> bool {
        self.pattern.is_match(tag)
    }
}

/// What the logger filter step did to a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggerFilterOutcome {
    /// Rows restricted to the named loggers
    Applied {
        loggers: Vec<String>,
        kept: usize,
        dropped: usize,
    },

    /// Station has no intervals in the registry
    SkippedNoRegistryData,

    /// Table has no rows, so there is no window to resolve
    SkippedEmptyTable,

    /// No live interval overlaps the table's time span
    SkippedNoLiveLogger,

    /// Table carries no logger tags to filter on
    SkippedNoLoggerColumn,

    /// Loggers resolved, but no row matched any of them; table left whole
    SkippedNoMatchingRows { loggers: Vec<String> },

    /// Logger filtering switched off in configuration
    Disabled,
}

impl LoggerFilterOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, LoggerFilterOutcome::Applied { .. })
    }

    /// One-line description for logs and summaries
    pub fn describe(&self) -> String {
        match self {
            LoggerFilterOutcome::Applied {
                loggers,
                kept,
                dropped,
            } => format!(
                "filtered to {} records from {} logger(s) [{}], {} dropped",
                kept,
                loggers.len(),
                loggers.join(", "),
                dropped
            ),
            LoggerFilterOutcome::SkippedNoRegistryData => {
                "no logger information for station, processing all data".to_string()
            }
            LoggerFilterOutcome::SkippedEmptyTable => "no records to filter".to_string(),
            LoggerFilterOutcome::SkippedNoLiveLogger => {
                "no live logger found for the time period".to_string()
            }
            LoggerFilterOutcome::SkippedNoLoggerColumn => {
                "no logger id column, cannot filter by live logger".to_string()
            }
            LoggerFilterOutcome::SkippedNoMatchingRows { loggers } => {
                format!("no data found for live loggers: {}", loggers.join(", "))
            }
            LoggerFilterOutcome::Disabled => "logger filtering disabled".to_string(),
        }
    }
}

/// Keep only rows recorded by the station's live logger(s).
///
/// The window is the table's own time span. All live loggers overlapping
/// it are admitted so that a hardware swap inside the period keeps both
/// sides. A single-instant table has an empty window, resolves no logger
/// and is left whole. Every "cannot filter" case returns the table
/// unchanged with an outcome saying why.
pub fn filter_by_live_loggers(
    table: ObservationTable,
    resolver: &LoggerResolver,
    station: &str,
) -> Result<(ObservationTable, LoggerFilterOutcome)> {
    if !resolver.registry().contains_station(station) {
        info!("No logger information for station {}, processing all data", station);
        return Ok((table, LoggerFilterOutcome::SkippedNoRegistryData));
    }

    let Some((window_start, window_end)) = table.time_span() else {
        return Ok((table, LoggerFilterOutcome::SkippedEmptyTable));
    };

    let live: Vec<&LoggerInterval> = resolver
        .resolve_all(station, window_start, window_end)
        .into_iter()
        .map(|resolved| resolved.interval)
        .collect();

    if live.is_empty() {
        warn!(
            "No live logger found for station {} between {} and {}",
            station, window_start, window_end
        );
        return Ok((table, LoggerFilterOutcome::SkippedNoLiveLogger));
    }

    let loggers: Vec<String> = live.iter().map(|i| i.logger_id.clone()).collect();
    info!(
        "Live loggers for station {}: {}",
        station,
        loggers.join(", ")
    );

    let Some(tags) = table.logger_tags() else {
        warn!("No logger id column for station {}, cannot filter by live logger", station);
        return Ok((table, LoggerFilterOutcome::SkippedNoLoggerColumn));
    };

    let Some(matcher) = LoggerMatcher::from_intervals(live.iter().copied())? else {
        return Ok((table, LoggerFilterOutcome::SkippedNoLiveLogger));
    };

    let keep: Vec<bool> = tags.iter().map(|tag| matcher.matches(tag)).collect();
    let kept = keep.iter().filter(|k| **k).count();

    if kept == 0 {
        warn!(
            "No data found for live loggers {} on station {}, keeping all records",
            loggers.join(", "),
            station
        );
        return Ok((table, LoggerFilterOutcome::SkippedNoMatchingRows { loggers }));
    }

    let dropped = table.len() - kept;
    let filtered = table.retain_rows(&keep)?;
    info!(
        "Filtered station {} to live logger data: {} records from {} logger(s)",
        station,
        kept,
        loggers.len()
    );

    Ok((
        filtered,
        LoggerFilterOutcome::Applied {
            loggers,
            kept,
            dropped,
        },
    ))
}

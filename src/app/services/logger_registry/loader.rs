//! Logger registry loading
//!
//! Builds the registry from raw log-of-loggers rows. Rows that cannot be
//! parsed are discarded with a warning; loading itself only fails when a
//! source frame lacks the required columns.

use super::LoggerRegistry;
use super::metadata::LoadStats;
use super::parser::{LoggerIntervalRow, parse_interval_row};
use crate::app::adapters::dataframe::{optional_string_column, string_column};
use crate::constants::columns;
use crate::{Error, Result};
use polars::prelude::DataFrame;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, warn};

impl LoggerRegistry {
    /// Load the registry from raw rows.
    ///
    /// # Arguments
    /// * `rows` - Log-of-loggers rows in file order
    /// * `formats` - Accepted timestamp formats, tried in order
    ///
    /// # Returns
    /// The registry and statistics describing kept and discarded rows
    pub fn from_rows<S: AsRef<str>>(
        rows: impl IntoIterator<Item = LoggerIntervalRow>,
        formats: &[S],
    ) -> (Self, LoadStats) {
        let start_time = Instant::now();
        let mut stats = LoadStats::new();
        let mut intervals = Vec::new();

        for row in rows {
            stats.rows_seen += 1;

            match parse_interval_row(&row, formats) {
                Ok(interval) => {
                    debug!(
                        "Logger {} on station {}: {} (live: {})",
                        interval.logger_id,
                        interval.station,
                        interval.period_label(),
                        interval.is_live
                    );
                    intervals.push(interval);
                }
                Err(e) => {
                    warn!("Discarding logger row {}: {}", stats.rows_seen, e);
                    stats.rows_discarded += 1;
                    stats.errors.push(format!("row {}: {}", stats.rows_seen, e));
                }
            }
        }

        stats.intervals_loaded = intervals.len();
        stats.live_intervals = intervals.iter().filter(|i| i.is_live).count();
        stats.stations = intervals
            .iter()
            .map(|interval| interval.station.as_str())
            .collect::<HashSet<_>>()
            .len();

        let registry = Self::from_intervals(intervals);
        stats.load_duration = start_time.elapsed();

        info!("{}", stats.summary());
        (registry, stats)
    }

    /// Load the registry from a polars frame holding the log of loggers.
    ///
    /// `Buoy`, `Loggerid`, `Start` and `Live` are required; `End`,
    /// `Live_wave` and `Comment` are optional.
    ///
    /// # Errors
    /// * Returns `Error::LoggerRegistry` if a required column is missing
    /// * Returns `Error::Polars` if a column cannot be read as text
    pub fn from_dataframe<S: AsRef<str>>(
        frame: &DataFrame,
        formats: &[S],
    ) -> Result<(Self, LoadStats)> {
        for required in [
            columns::LOGGER_STATION,
            columns::LOGGER_LOGGER_ID,
            columns::LOGGER_START,
            columns::LOGGER_LIVE,
        ] {
            if frame.column(required).is_err() {
                return Err(Error::logger_registry(format!(
                    "Log of loggers is missing required column '{}'",
                    required
                )));
            }
        }

        let stations = string_column(frame, columns::LOGGER_STATION)?;
        let logger_ids = string_column(frame, columns::LOGGER_LOGGER_ID)?;
        let starts = string_column(frame, columns::LOGGER_START)?;
        let lives = string_column(frame, columns::LOGGER_LIVE)?;
        let ends = optional_string_column(frame, columns::LOGGER_END)?;
        let live_waves = optional_string_column(frame, columns::LOGGER_LIVE_WAVE)?;
        let comments = optional_string_column(frame, columns::LOGGER_COMMENT)?;

        let rows = (0..frame.height()).map(|i| LoggerIntervalRow {
            station: stations[i].clone().unwrap_or_default(),
            logger_id: logger_ids[i].clone().unwrap_or_default(),
            start: starts[i].clone(),
            end: ends[i].clone(),
            live: lives[i].clone(),
            live_wave: live_waves[i].clone(),
            comment: comments[i].clone(),
        });

        Ok(Self::from_rows(rows, formats))
    }
}

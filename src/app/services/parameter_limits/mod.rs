//! Per-parameter QC thresholds with station overrides
//!
//! Limits are held in two layers: defaults that apply to every station, and
//! station-specific entries. Lookups merge the two field by field (station,
//! then default, then absent). The table is immutable once built and is
//! shared with workers behind an `Arc`.
//!
//! # Components
//!
//! - [`loader`] - Building limits from rows or a polars `DataFrame`
//! - [`builtin`] - Fallback table used when no limits source is available

use crate::app::models::Limits;
use crate::constants::DEFAULT_STATION;
use std::collections::{BTreeSet, HashMap};

pub mod builtin;
pub mod loader;

pub use loader::{LimitsLoadStats, ParameterLimitRow};

/// Immutable default and station-specific limits
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterLimits {
    defaults: HashMap<String, Limits>,
    stations: HashMap<String, HashMap<String, Limits>>,
}

impl ParameterLimits {
    /// An empty table: every test that needs a limit is skipped
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ParameterLimitsBuilder {
        ParameterLimitsBuilder::default()
    }

    /// Effective limits for a parameter at a station.
    ///
    /// Each field comes from the station entry if set there, otherwise from
    /// the default entry, otherwise it is absent.
    pub fn effective_limits(&self, station: &str, parameter: &str) -> Limits {
        let fallback = self.default_limits(parameter).unwrap_or_default();

        match self.station_limits(station, parameter) {
            Some(specific) => specific.merged_over(&fallback),
            None => fallback,
        }
    }

    pub fn default_limits(&self, parameter: &str) -> Option<Limits> {
        self.defaults.get(parameter).copied()
    }

    /// Station entry only, without the default merged in
    pub fn station_limits(&self, station: &str, parameter: &str) -> Option<Limits> {
        self.stations
            .get(station)
            .and_then(|parameters| parameters.get(parameter))
            .copied()
    }

    pub fn has_station_overrides(&self, station: &str) -> bool {
        self.stations
            .get(station)
            .is_some_and(|parameters| !parameters.is_empty())
    }

    /// Every parameter named by a default or station entry, sorted
    pub fn parameters(&self) -> Vec<&str> {
        self.defaults
            .keys()
            .chain(self.stations.values().flat_map(HashMap::keys))
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Stations with overrides, sorted
    pub fn stations(&self) -> Vec<&str> {
        let mut stations: Vec<&str> = self.stations.keys().map(String::as_str).collect();
        stations.sort_unstable();
        stations
    }

    /// Number of default plus station-specific entries
    pub fn entry_count(&self) -> usize {
        self.defaults.len() + self.stations.values().map(HashMap::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Export as rows: defaults first, then stations, each sorted by
    /// station and parameter
    pub fn to_rows(&self) -> Vec<ParameterLimitRow> {
        let mut rows: Vec<ParameterLimitRow> = Vec::with_capacity(self.entry_count());

        let mut defaults: Vec<(&String, &Limits)> = self.defaults.iter().collect();
        defaults.sort_by(|a, b| a.0.cmp(b.0));
        rows.extend(
            defaults
                .into_iter()
                .map(|(parameter, limits)| ParameterLimitRow::from_limits(parameter, DEFAULT_STATION, limits)),
        );

        for station in self.stations() {
            let Some(parameters) = self.stations.get(station) else {
                continue;
            };
            let mut entries: Vec<(&String, &Limits)> = parameters.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            rows.extend(
                entries
                    .into_iter()
                    .map(|(parameter, limits)| ParameterLimitRow::from_limits(parameter, station, limits)),
            );
        }

        rows
    }

    pub(crate) fn insert(&mut self, station: &str, parameter: &str, limits: Limits) -> bool {
        let replaced = if station == DEFAULT_STATION {
            self.defaults.insert(parameter.to_string(), limits)
        } else {
            self.stations
                .entry(station.to_string())
                .or_default()
                .insert(parameter.to_string(), limits)
        };
        replaced.is_some()
    }
}

/// Programmatic construction of a limits table
#[derive(Debug, Clone, Default)]
pub struct ParameterLimitsBuilder {
    limits: ParameterLimits,
}

impl ParameterLimitsBuilder {
    /// Set the default limits for a parameter
    pub fn default_limits(mut self, parameter: &str, limits: Limits) -> Self {
        self.limits.insert(DEFAULT_STATION, parameter, limits);
        self
    }

    /// Set station-specific limits for a parameter
    pub fn station_limits(mut self, station: &str, parameter: &str, limits: Limits) -> Self {
        self.limits.insert(station, parameter, limits);
        self
    }

    pub fn build(self) -> ParameterLimits {
        self.limits
    }
}

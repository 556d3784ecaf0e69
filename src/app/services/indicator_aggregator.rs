//! Record-level QC status from key parameter indicators
//!
//! A record is QC-complete (`qc_ind = 1`) when every key parameter is either
//! good (1) or missing (9). Aggregation only ever promotes: records that do
//! not qualify keep whatever `qc_ind` they had, and no explicit fail code is
//! written.

use crate::app::models::{Indicator, ObservationTable};
use crate::config::QcConfig;
use tracing::{debug, warn};

/// Counts from one aggregation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationStats {
    pub records: usize,
    pub promoted: usize,

    /// Records at `qc_ind = 1` after the pass
    pub qc_complete: usize,

    /// Key parameters present in the table and used for the decision
    pub key_parameters_used: Vec<String>,

    /// Key parameters the table does not carry
    pub key_parameters_absent: Vec<String>,
}

impl AggregationStats {
    pub fn qc_complete_percentage(&self) -> f64 {
        if self.records == 0 {
            0.0
        } else {
            (self.qc_complete as f64 / self.records as f64) * 100.0
        }
    }
}

/// Derives `qc_ind` from an explicit set of key parameters
#[derive(Debug, Clone)]
pub struct IndicatorAggregator {
    key_parameters: Vec<String>,
}

impl IndicatorAggregator {
    pub fn new<S: Into<String>>(key_parameters: impl IntoIterator<Item = S>) -> Self {
        Self {
            key_parameters: key_parameters.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &QcConfig) -> Self {
        Self::new(config.key_parameters.iter().cloned())
    }

    pub fn key_parameters(&self) -> &[String] {
        &self.key_parameters
    }

    /// Promote records whose key parameters are all good or missing.
    ///
    /// Key parameters absent from the table are ignored. With none present,
    /// nothing is promoted.
    pub fn aggregate(&self, table: &mut ObservationTable) -> AggregationStats {
        let mut stats = AggregationStats {
            records: table.len(),
            ..AggregationStats::default()
        };

        for key in &self.key_parameters {
            if table.parameter(key).is_some() {
                stats.key_parameters_used.push(key.clone());
            } else {
                stats.key_parameters_absent.push(key.clone());
            }
        }

        if !stats.key_parameters_absent.is_empty() {
            debug!(
                "Key parameters not in table, ignored for qc_ind: {}",
                stats.key_parameters_absent.join(", ")
            );
        }

        if stats.key_parameters_used.is_empty() {
            warn!(
                "None of the key parameters [{}] are present, qc_ind left unchanged",
                self.key_parameters.join(", ")
            );
            stats.qc_complete = table.qc_complete_count();
            return stats;
        }

        let complete: Vec<bool> = (0..table.len())
            .map(|row| {
                stats.key_parameters_used.iter().all(|key| {
                    table
                        .parameter(key)
                        .and_then(|column| column.indicators().get(row))
                        .is_some_and(|indicator| indicator.is_good_or_missing())
                })
            })
            .collect();

        for (record, complete) in table.record_indicators_mut().iter_mut().zip(complete) {
            if complete && *record != Indicator::Good {
                *record = Indicator::Good;
                stats.promoted += 1;
            }
        }

        stats.qc_complete = table.qc_complete_count();
        debug!(
            "Aggregated qc_ind over {}: {} of {} records promoted",
            stats.key_parameters_used.join(", "),
            stats.promoted,
            stats.records
        );
        stats
    }
}

//! Batch results and per-station summaries

use super::QcUnitResult;
use std::collections::BTreeMap;
use std::time::Duration;

/// A unit that could not be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFailure {
    pub station: String,
    pub label: String,
    pub error: String,
}

/// Records and QC-complete counts for one station across its units
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationSummary {
    pub units: usize,
    pub failed_units: usize,
    pub records: usize,
    pub qc_complete: usize,
}

impl StationSummary {
    pub fn qc_complete_percentage(&self) -> f64 {
        if self.records == 0 {
            0.0
        } else {
            (self.qc_complete as f64 / self.records as f64) * 100.0
        }
    }
}

/// Outcome of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Successful units ordered by station, then label
    pub completed: Vec<QcUnitResult>,

    /// Failed units ordered by station, then label
    pub failures: Vec<UnitFailure>,

    pub elapsed: Duration,
}

impl BatchResult {
    pub fn total_units(&self) -> usize {
        self.completed.len() + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn unit(&self, station: &str, label: &str) -> Option<&QcUnitResult> {
        self.completed
            .iter()
            .find(|result| result.station == station && result.label == label)
    }

    /// Summary per station, keyed and ordered by station id
    pub fn station_summaries(&self) -> BTreeMap<String, StationSummary> {
        let mut summaries: BTreeMap<String, StationSummary> = BTreeMap::new();

        for result in &self.completed {
            let summary = summaries.entry(result.station.clone()).or_default();
            summary.units += 1;
            summary.records += result.records();
            summary.qc_complete += result.qc_complete();
        }
        for failure in &self.failures {
            summaries.entry(failure.station.clone()).or_default().failed_units += 1;
        }

        summaries
    }

    pub fn total_records(&self) -> usize {
        self.completed.iter().map(QcUnitResult::records).sum()
    }

    pub fn summary_line(&self) -> String {
        format!(
            "QC batch finished: {} of {} units completed, {} failed, {} records in {:.2}s",
            self.completed.len(),
            self.total_units(),
            self.failures.len(),
            self.total_records(),
            self.elapsed.as_secs_f64()
        )
    }

    pub(super) fn sort(&mut self) {
        self.completed
            .sort_by(|a, b| (&a.station, &a.label).cmp(&(&b.station, &b.label)));
        self.failures
            .sort_by(|a, b| (&a.station, &a.label).cmp(&(&b.station, &b.label)));
    }
}

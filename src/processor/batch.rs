//! Concurrent processing of many units
//!
//! Units run on the blocking thread pool, at most `workers` at a time. The
//! registry and limits are shared read-only; each unit's table is owned by
//! the worker processing it. A unit that fails, or whose worker panics, is
//! recorded and the rest of the batch carries on.

use super::stats::{BatchResult, UnitFailure};
use super::{QcUnit, QcUnitResult, StationQcProcessor};
use crate::config::QcConfig;
use crate::{Error, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task;
use tracing::{error, info};

/// Bounded worker pool over [`StationQcProcessor`]
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    processor: Arc<StationQcProcessor>,
    workers: usize,
    show_progress: bool,
}

impl BatchProcessor {
    /// # Errors
    /// Returns `Error::Configuration` if the configuration fails validation
    pub fn new(processor: StationQcProcessor, config: &QcConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            processor: Arc::new(processor),
            workers: config.workers,
            show_progress: config.show_progress,
        })
    }

    pub fn processor(&self) -> &StationQcProcessor {
        &self.processor
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Process every unit and collect results and failures
    pub async fn run(&self, units: Vec<QcUnit>) -> BatchResult {
        let start_time = Instant::now();
        let total_units = units.len();
        info!(
            "Starting QC batch: {} units on {} workers",
            total_units, self.workers
        );

        let progress = self
            .show_progress
            .then(|| create_progress_bar(total_units as u64, "Running QC"));
        let semaphore = Arc::new(Semaphore::new(self.workers));

        let outcomes: Vec<(String, String, Result<QcUnitResult>)> = stream::iter(units)
            .map(|unit| {
                let semaphore = Arc::clone(&semaphore);
                let processor = Arc::clone(&self.processor);
                let progress = progress.clone();
                async move {
                    let station = unit.station.clone();
                    let label = unit.label.clone();
                    let outcome = run_unit(semaphore, processor, unit).await;
                    if let Some(pb) = &progress {
                        pb.inc(1);
                    }
                    (station, label, outcome)
                }
            })
            .buffer_unordered(self.workers)
            .collect()
            .await;

        let mut result = BatchResult::default();
        for (station, label, outcome) in outcomes {
            match outcome {
                Ok(unit_result) => result.completed.push(unit_result),
                Err(e) => {
                    error!("QC failed for {}/{}: {}", station, label, e);
                    result.failures.push(UnitFailure {
                        station,
                        label,
                        error: e.to_string(),
                    });
                }
            }
        }
        result.sort();
        result.elapsed = start_time.elapsed();

        if let Some(pb) = progress {
            pb.finish_with_message(format!(
                "{} units processed, {} failed",
                result.completed.len(),
                result.failures.len()
            ));
        }
        info!("{}", result.summary_line());
        result
    }
}

async fn run_unit(
    semaphore: Arc<Semaphore>,
    processor: Arc<StationQcProcessor>,
    unit: QcUnit,
) -> Result<QcUnitResult> {
    let unit_id = unit.id();
    let _permit = semaphore
        .acquire_owned()
        .await
        .map_err(|e| Error::worker_failed(&unit_id, e.to_string()))?;

    match task::spawn_blocking(move || processor.process(unit)).await {
        Ok(outcome) => outcome,
        Err(join_error) => Err(Error::worker_failed(unit_id, join_error.to_string())),
    }
}

/// Progress bar for batch runs
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} [{per_sec}] ETA: {eta}")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

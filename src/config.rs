//! Configuration management and validation.
//!
//! Provides the processing configuration for buoy QC runs: which parameters
//! decide the record-level status, how logger timestamps are read, the
//! flat-line window, worker counts and the observation frame layout.

use crate::app::adapters::dataframe::FrameLayout;
use crate::constants::{
    DEFAULT_KEY_PARAMETERS, DEFAULT_TIMESTAMP_FORMATS, FLAT_LINE_WINDOW, MIN_FLAT_LINE_WINDOW,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Main configuration for buoy QC processing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QcConfig {
    /// Parameters whose indicators decide `qc_ind`
    pub key_parameters: Vec<String>,

    /// Restrict QC to these parameters (all discovered parameters if unset)
    pub qc_parameters: Option<Vec<String>>,

    /// Accepted logger timestamp formats, tried in order
    pub timestamp_formats: Vec<String>,

    /// Consecutive identical values that count as a flat line
    pub flat_line_window: usize,

    /// Move absent or non-finite values still at 0 to 9 before testing;
    /// when off they are promoted to 1
    pub reclassify_missing: bool,

    /// Restrict each unit to its live logger's rows
    pub enable_logger_filtering: bool,

    /// Maximum units processed concurrently
    pub workers: usize,

    /// Show a progress bar while running batches
    pub show_progress: bool,

    /// Column naming of observation frames
    pub frame: FrameLayout,
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            key_parameters: DEFAULT_KEY_PARAMETERS.iter().map(|p| p.to_string()).collect(),
            qc_parameters: None,
            timestamp_formats: DEFAULT_TIMESTAMP_FORMATS
                .iter()
                .map(|f| f.to_string())
                .collect(),
            flat_line_window: FLAT_LINE_WINDOW,
            reclassify_missing: true,
            enable_logger_filtering: true,
            workers: num_cpus::get(),
            show_progress: false,
            frame: FrameLayout::default(),
        }
    }
}

impl QcConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration with custom key parameters
    pub fn with_key_parameters<S: Into<String>>(mut self, parameters: impl IntoIterator<Item = S>) -> Self {
        self.key_parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict QC to an explicit parameter list
    pub fn with_qc_parameters<S: Into<String>>(mut self, parameters: impl IntoIterator<Item = S>) -> Self {
        self.qc_parameters = Some(parameters.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_timestamp_formats<S: Into<String>>(mut self, formats: impl IntoIterator<Item = S>) -> Self {
        self.timestamp_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_flat_line_window(mut self, window: usize) -> Self {
        self.flat_line_window = window;
        self
    }

    /// Promote absent values at 0 to 1 instead of moving them to 9
    pub fn without_missing_reclassification(mut self) -> Self {
        self.reclassify_missing = false;
        self
    }

    pub fn without_logger_filtering(mut self) -> Self {
        self.enable_logger_filtering = false;
        self
    }

    /// Create configuration with custom worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    pub fn with_frame_layout(mut self, layout: FrameLayout) -> Self {
        self.frame = layout;
        self
    }

    /// Check the configuration is usable
    ///
    /// # Errors
    /// Returns `Error::Configuration` describing the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::configuration("workers must be greater than zero"));
        }
        if self.flat_line_window < MIN_FLAT_LINE_WINDOW {
            return Err(Error::configuration(format!(
                "flat_line_window must be at least {}, got {}",
                MIN_FLAT_LINE_WINDOW, self.flat_line_window
            )));
        }
        if self.key_parameters.iter().any(|p| p.trim().is_empty()) {
            return Err(Error::configuration("key_parameters contains an empty name"));
        }
        if let Some(parameters) = &self.qc_parameters {
            if parameters.iter().any(|p| p.trim().is_empty()) {
                return Err(Error::configuration("qc_parameters contains an empty name"));
            }
        }
        if self.frame.time_column.is_empty() || self.frame.indicator_prefix.is_empty() {
            return Err(Error::configuration(
                "frame layout needs a time column and an indicator prefix",
            ));
        }

        debug!(
            "Configuration: {} workers, key parameters [{}], flat line window {}",
            self.workers,
            self.key_parameters.join(", "),
            self.flat_line_window
        );
        Ok(())
    }
}

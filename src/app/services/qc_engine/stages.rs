//! QC test stages
//!
//! Each stage is a pure transformation over one parameter's samples in
//! timestamp order. A stage returns the next samples and how many it
//! flagged. Stages may set an indicator to 4 (or 9 for the missing check)
//! but never move a failed sample back to a passing code.

use crate::app::models::{Indicator, Limits};
use std::fmt;

/// One observation of a parameter as seen by the QC stages
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QcSample {
    pub value: Option<f64>,
    pub indicator: Indicator,
}

impl QcSample {
    pub fn new(value: Option<f64>, indicator: Indicator) -> Self {
        Self { value, indicator }
    }

    /// The value, unless the sample is missing
    fn present_value(&self) -> Option<f64> {
        if self.indicator.is_missing() {
            return None;
        }
        self.value.filter(|v| v.is_finite())
    }
}

/// A QC test in pipeline order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QcStage {
    /// Reclassify absent or non-finite values to 9
    MissingCheck,

    /// Flag values outside the configured bound(s)
    Range { min: Option<f64>, max: Option<f64> },

    /// Flag the later sample of any adjacent jump larger than the threshold
    Spike { threshold: f64 },

    /// Flag every sample in a run of at least `window` identical values
    FlatLine { window: usize },

    /// Set every sample still at 0 to 1
    Promotion,
}

/// Tests that can be skipped for lack of limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkippedTest {
    Range,
    Spike,
}

impl fmt::Display for SkippedTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkippedTest::Range => write!(f, "range"),
            SkippedTest::Spike => write!(f, "spike"),
        }
    }
}

/// Samples after a stage together with the number it flagged
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutcome {
    pub samples: Vec<QcSample>,
    pub flagged: usize,
}

impl QcStage {
    pub fn name(&self) -> &'static str {
        match self {
            QcStage::MissingCheck => "missing",
            QcStage::Range { .. } => "range",
            QcStage::Spike { .. } => "spike",
            QcStage::FlatLine { .. } => "flat_line",
            QcStage::Promotion => "promotion",
        }
    }

    /// Run the stage over samples in timestamp order
    pub fn apply(&self, samples: Vec<QcSample>) -> StageOutcome {
        match *self {
            QcStage::MissingCheck => missing_check(samples),
            QcStage::Range { min, max } => range_test(samples, min, max),
            QcStage::Spike { threshold } => spike_test(samples, threshold),
            QcStage::FlatLine { window } => flat_line_test(samples, window),
            QcStage::Promotion => promote(samples),
        }
    }
}

/// Build the ordered stage list for a parameter from its effective limits.
///
/// With `reclassify_missing` off there is no missing check: an absent value
/// still at 0 is ignored by the tests and promoted to 1 like any other
/// untouched sample.
pub fn build_pipeline(
    limits: &Limits,
    flat_line_window: usize,
    reclassify_missing: bool,
) -> (Vec<QcStage>, Vec<SkippedTest>) {
    let mut stages = Vec::new();
    let mut skipped = Vec::new();

    if reclassify_missing {
        stages.push(QcStage::MissingCheck);
    }

    if limits.has_range() {
        stages.push(QcStage::Range {
            min: limits.min_value,
            max: limits.max_value,
        });
    } else {
        skipped.push(SkippedTest::Range);
    }

    match limits.spike_threshold {
        Some(threshold) => stages.push(QcStage::Spike { threshold }),
        None => skipped.push(SkippedTest::Spike),
    }

    stages.push(QcStage::FlatLine {
        window: flat_line_window,
    });
    stages.push(QcStage::Promotion);

    (stages, skipped)
}

fn missing_check(mut samples: Vec<QcSample>) -> StageOutcome {
    let mut flagged = 0;
    for sample in samples.iter_mut() {
        let absent = sample.value.is_none_or(|v| !v.is_finite());
        if absent && !sample.indicator.is_missing() {
            sample.indicator = Indicator::Missing;
            flagged += 1;
        }
    }
    StageOutcome { samples, flagged }
}

fn range_test(mut samples: Vec<QcSample>, min: Option<f64>, max: Option<f64>) -> StageOutcome {
    let mut flagged = 0;
    for sample in samples.iter_mut() {
        let Some(value) = sample.present_value() else {
            continue;
        };

        let below = min.is_some_and(|min| value < min);
        let above = max.is_some_and(|max| value > max);
        if below || above {
            sample.indicator = Indicator::Failed;
            flagged += 1;
        }
    }
    StageOutcome { samples, flagged }
}

fn spike_test(mut samples: Vec<QcSample>, threshold: f64) -> StageOutcome {
    let mut flagged = 0;
    let mut previous: Option<f64> = None;

    for sample in samples.iter_mut() {
        let Some(value) = sample.present_value() else {
            continue;
        };

        if let Some(last) = previous {
            if (value - last).abs() > threshold {
                sample.indicator = Indicator::Failed;
                flagged += 1;
            }
        }
        previous = Some(value);
    }
    StageOutcome { samples, flagged }
}

fn flat_line_test(mut samples: Vec<QcSample>, window: usize) -> StageOutcome {
    // Positions of the non-missing subsequence
    let present: Vec<(usize, f64)> = samples
        .iter()
        .enumerate()
        .filter_map(|(position, sample)| sample.present_value().map(|v| (position, v)))
        .collect();

    let mut flagged = 0;
    let mut run_start = 0;
    while run_start < present.len() {
        let run_value = present[run_start].1;
        let run_end = present[run_start..]
            .iter()
            .position(|&(_, v)| v != run_value)
            .map_or(present.len(), |offset| run_start + offset);

        if window > 0 && run_end - run_start >= window {
            for &(position, _) in &present[run_start..run_end] {
                samples[position].indicator = Indicator::Failed;
                flagged += 1;
            }
        }
        run_start = run_end;
    }
    StageOutcome { samples, flagged }
}

fn promote(mut samples: Vec<QcSample>) -> StageOutcome {
    let mut flagged = 0;
    for sample in samples.iter_mut() {
        if sample.indicator == Indicator::NotChecked {
            sample.indicator = Indicator::Good;
            flagged += 1;
        }
    }
    StageOutcome { samples, flagged }
}

//! Window-level agreement between predicted labels and annotated events.
//!
//! A recording of `N` raw samples carries a set of annotated event sample
//! indices. An external model emits `M` integer labels, one per window. The
//! evaluator resamples the annotations down to `M` windows (an event
//! anywhere in a window marks it positive), compares window by window, and
//! reports sensitivity and specificity from the resulting 2x2 tally.

mod resample;


use std::collections::BTreeSet;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::EvaluationError;

pub use resample::{dense_ground_truth, overlap, resample};

/// Raw samples scanned per window, independent of the computed overlap.
pub const DEFAULT_WINDOW_CAP: usize = 256;

/// How a prediction/truth mismatch is assigned to FP or FN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelConvention {
    /// Predicted event with no annotated event counts as FN; a missed
    /// annotated event counts as FP.
    #[default]
    Reference,
    /// Textbook assignment: predicted-but-absent is FP, missed is FN.
    Standard,
}

/// Confusion matrix cell for a single window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    TruePositive,
    TrueNegative,
    FalsePositive,
    FalseNegative,
}

impl LabelConvention {
    pub fn classify(self, predicted: bool, actual: bool) -> Cell {
        match (predicted, actual) {
            (true, true) => Cell::TruePositive,
            (false, false) => Cell::TrueNegative,
            (true, false) => match self {
                LabelConvention::Reference => Cell::FalseNegative,
                LabelConvention::Standard => Cell::FalsePositive,
            },
            (false, true) => match self {
                LabelConvention::Reference => Cell::FalsePositive,
                LabelConvention::Standard => Cell::FalseNegative,
            },
        }
    }
}

/// Counts of windows per confusion cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionTally {
    pub tp: usize,
    pub tn: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
}

impl ConfusionTally {
    pub fn record(&mut self, cell: Cell) {
        match cell {
            Cell::TruePositive => self.tp += 1,
            Cell::TrueNegative => self.tn += 1,
            Cell::FalsePositive => self.fp += 1,
            Cell::FalseNegative => self.fn_ += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    /// `TP / (TP + FN)`, or 0.0 when there are no true positives.
    pub fn sensitivity(&self) -> f64 {
        if self.tp == 0 {
            0.0
        } else {
            self.tp as f64 / (self.tp + self.fn_) as f64
        }
    }

    /// `TN / (TN + FP)`, or 0.0 when there are no true negatives.
    pub fn specificity(&self) -> f64 {
        if self.tn == 0 {
            0.0
        } else {
            self.tn as f64 / (self.tn + self.fp) as f64
        }
    }

    pub fn outcome(&self) -> Outcome {
        Outcome {
            sensitivity: self.sensitivity(),
            specificity: self.specificity(),
        }
    }
}

/// Sensitivity/specificity pair, both in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub sensitivity: f64,
    pub specificity: f64,
}

/// Full result of one evaluator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub tally: ConfusionTally,
    pub outcome: Outcome,
    /// Raw samples per prediction window
    pub overlap: usize,
    /// Number of windows whose resampled ground truth is positive
    pub resampled_positive_windows: usize,
}

/// Evaluator with a fixed window cap and label convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluator {
    window_cap: usize,
    convention: LabelConvention,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            window_cap: DEFAULT_WINDOW_CAP,
            convention: LabelConvention::Reference,
        }
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw-sample span scanned per window. A cap of 0 is rejected
    /// with a warning and the current cap is kept.
    pub fn with_window_cap(mut self, window_cap: usize) -> Self {
        if window_cap > 0 {
            self.window_cap = window_cap;
        } else {
            warn!(
                "[Evaluator] Ignoring window cap 0, keeping {}",
                self.window_cap
            );
        }
        self
    }

    pub fn with_convention(mut self, convention: LabelConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn window_cap(&self) -> usize {
        self.window_cap
    }

    /// Resample the annotations to `predictions.len()` windows and tally
    /// agreement. A label `> 0` means "event present".
    pub fn evaluate(
        &self,
        signal_length: usize,
        events: &BTreeSet<usize>,
        predictions: &[i64],
    ) -> Result<Evaluation, EvaluationError> {
        if predictions.is_empty() {
            return Err(EvaluationError::EmptyPredictions);
        }

        let dense = dense_ground_truth(signal_length, events)?;
        let step = overlap(signal_length, predictions.len())?;
        let truth = resample(&dense, predictions.len(), self.window_cap)?;

        let mut tally = ConfusionTally::default();
        for (&predicted, &actual) in predictions.iter().zip(&truth) {
            tally.record(self.convention.classify(predicted > 0, actual > 0));
        }

        debug!("[Evaluator] TP={} FN={}", tally.tp, tally.fn_);
        debug!("[Evaluator] FP={} TN={}", tally.fp, tally.tn);

        Ok(Evaluation {
            tally,
            outcome: tally.outcome(),
            overlap: step,
            resampled_positive_windows: truth.iter().filter(|&&value| value > 0).count(),
        })
    }
}

/// Evaluate with the default window cap and reference label convention.
pub fn evaluate(
    signal_length: usize,
    events: &BTreeSet<usize>,
    predictions: &[i64],
) -> Result<Outcome, EvaluationError> {
    Evaluator::default()
        .evaluate(signal_length, events, predictions)
        .map(|evaluation| evaluation.outcome)
}

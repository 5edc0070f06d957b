// Per-record report rendering

use anyhow::Result;
use serde::Serialize;

use crate::evaluation::{ConfusionTally, Evaluation, Outcome};

/// Result of evaluating one result file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordReport {
    pub file_name: String,
    pub record_id: String,
    pub tally: ConfusionTally,
    pub outcome: Outcome,
    pub overlap: usize,
}

impl RecordReport {
    pub fn new(file_name: &str, record_id: &str, evaluation: &Evaluation) -> Self {
        Self {
            file_name: file_name.to_string(),
            record_id: record_id.to_string(),
            tally: evaluation.tally,
            outcome: evaluation.outcome,
            overlap: evaluation.overlap,
        }
    }
}

/// A result file that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileFailure {
    pub file_name: String,
    pub record_id: String,
    pub error: String,
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub reports: Vec<RecordReport>,
    pub failures: Vec<FileFailure>,
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Bracketed console section: raw `TP FN` / `FP TN` counts, then the pair.
pub fn render_table(report: &RecordReport) -> String {
    let tally = &report.tally;
    format!(
        "====={}=====\n{} {}\n{} {}\n({:?}, {:?})\n==============\n",
        report.file_name,
        tally.tp,
        tally.fn_,
        tally.fp,
        tally.tn,
        report.outcome.sensitivity,
        report.outcome.specificity,
    )
}

/// Single-line JSON object terminated by a newline.
pub fn render_json(report: &RecordReport) -> Result<String> {
    let mut line = serde_json::to_string(report)?;
    line.push('\n');
    Ok(line)
}

//! Batch evaluation over a directory of result files.
//!
//! File selection is a pure function of the directory listing so it can be
//! tested without touching disk. The driver then walks the selected files
//! in order: load ground truth for the derived record id, read the
//! predictions, evaluate, and render a report section.

mod report;


use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::{
    log_evaluation_error, log_input_error, ErrorCode, EvaluationError, InputError,
};
use crate::evaluation::{Evaluation, Evaluator};
use crate::predictions::read_predictions;
use crate::records::GroundTruthStore;

pub use report::{render_json, render_table, BatchSummary, FileFailure, RecordReport};

/// What the driver does when one result file fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the batch at the first failing file.
    #[default]
    Abort,
    /// Record the failure and move on to the next file.
    Continue,
}

/// Console rendering of per-record results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Bracketed section per record with raw counts and the rate pair.
    #[default]
    Table,
    /// One JSON object per record per line.
    Json,
}

/// A result file selected for evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFile {
    pub file_name: String,
    pub record_id: String,
}

/// Record id for a result file: its first `record_id_len` characters.
pub fn record_id_for(file_name: &str, record_id_len: usize) -> String {
    file_name.chars().take(record_id_len).collect()
}

/// Keep names containing `marker`, sorted, each paired with its record id.
pub fn select_result_files<I, S>(names: I, marker: &str, record_id_len: usize) -> Vec<ResultFile>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut selected: Vec<ResultFile> = names
        .into_iter()
        .filter(|name| name.as_ref().contains(marker))
        .map(|name| ResultFile {
            file_name: name.as_ref().to_string(),
            record_id: record_id_for(name.as_ref(), record_id_len),
        })
        .collect();
    selected.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    selected
}

/// List regular files in `dir` and select the result files among them.
pub fn discover_result_files(
    dir: &Path,
    marker: &str,
    record_id_len: usize,
) -> Result<Vec<ResultFile>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => warn!("[Batch] Skipping non UTF-8 file name {:?}", name),
        }
    }
    Ok(select_result_files(names, marker, record_id_len))
}

/// Runs the evaluator over every selected result file.
pub struct BatchDriver<S: GroundTruthStore> {
    store: S,
    predictions_dir: PathBuf,
    marker: String,
    record_id_len: usize,
    label_offset: i64,
    evaluator: Evaluator,
    failure_policy: FailurePolicy,
    format: ReportFormat,
}

impl<S: GroundTruthStore> BatchDriver<S> {
    pub fn new(store: S, config: &AppConfig) -> Self {
        Self {
            store,
            predictions_dir: config.paths.predictions_dir.clone(),
            marker: config.paths.filename_marker.clone(),
            record_id_len: config.paths.record_id_len,
            label_offset: config.evaluation.label_offset,
            evaluator: Evaluator::new()
                .with_window_cap(config.evaluation.window_cap)
                .with_convention(config.evaluation.convention),
            failure_policy: config.batch.failure_policy,
            format: config.batch.format,
        }
    }

    pub fn discover(&self) -> Result<Vec<ResultFile>> {
        discover_result_files(&self.predictions_dir, &self.marker, self.record_id_len)
    }

    /// Evaluate one record against one prediction file.
    pub fn evaluate_file(&self, record_id: &str, predictions_path: &Path) -> Result<Evaluation> {
        let truth = self
            .store
            .load(record_id)
            .with_context(|| format!("loading ground truth for record {record_id}"))?;
        let predictions = read_predictions(predictions_path, self.label_offset)
            .with_context(|| format!("reading predictions {}", predictions_path.display()))?;
        let evaluation = self
            .evaluator
            .evaluate(truth.signal_length, &truth.events, &predictions)
            .with_context(|| format!("evaluating record {record_id}"))?;
        Ok(evaluation)
    }

    /// Evaluate a single result file and write its report section.
    pub fn run_single<W: Write>(
        &self,
        record_id: &str,
        predictions_path: &Path,
        out: &mut W,
    ) -> Result<RecordReport> {
        let file_name = predictions_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| predictions_path.display().to_string());
        let evaluation = self.evaluate_file(record_id, predictions_path)?;
        let report = RecordReport::new(&file_name, record_id, &evaluation);
        self.emit(&report, out)?;
        Ok(report)
    }

    /// Evaluate every discovered result file in name order.
    ///
    /// Under [`FailurePolicy::Abort`] the first failure is returned as an
    /// error; under [`FailurePolicy::Continue`] it is logged and collected.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<BatchSummary> {
        let files = self.discover()?;
        info!(
            "[Batch] {} result files matching '{}' in {}",
            files.len(),
            self.marker,
            self.predictions_dir.display()
        );

        let mut summary = BatchSummary::default();
        for file in files {
            let path = self.predictions_dir.join(&file.file_name);
            match self.run_single(&file.record_id, &path, out) {
                Ok(report) => summary.reports.push(report),
                Err(err) => match self.failure_policy {
                    FailurePolicy::Abort => {
                        return Err(err.context(format!("batch aborted at {}", file.file_name)))
                    }
                    FailurePolicy::Continue => {
                        log_typed_error(&err, &file.file_name);
                        warn!("[Batch] {} failed: {:#}", file.file_name, err);
                        summary.failures.push(FileFailure {
                            file_name: file.file_name,
                            record_id: file.record_id,
                            error: format!("{err:#}"),
                        });
                    }
                },
            }
        }
        Ok(summary)
    }

    fn emit<W: Write>(&self, report: &RecordReport, out: &mut W) -> Result<()> {
        let rendered = match self.format {
            ReportFormat::Table => render_table(report),
            ReportFormat::Json => render_json(report)?,
        };
        out.write_all(rendered.as_bytes())
            .context("writing report")?;
        Ok(())
    }
}

/// Log the first typed error in `err`'s cause chain and return its code.
fn log_typed_error(err: &anyhow::Error, file_name: &str) -> Option<i32> {
    for cause in err.chain() {
        if let Some(input) = cause.downcast_ref::<InputError>() {
            log_input_error(input, file_name);
            return Some(input.code());
        }
        if let Some(evaluation) = cause.downcast_ref::<EvaluationError>() {
            log_evaluation_error(evaluation, file_name);
            return Some(evaluation.code());
        }
    }
    None
}

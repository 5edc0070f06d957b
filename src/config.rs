//! Configuration for evaluation runs
//!
//! Paths, the result-file marker and evaluator knobs are loaded from a JSON
//! file so batches can be pointed at a different database or prediction
//! export without touching code. Every field has a default, and the CLI
//! overrides individual values on top of whatever was loaded.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::batch::{FailurePolicy, ReportFormat};
use crate::error::InputError;
use crate::evaluation::{LabelConvention, DEFAULT_WINDOW_CAP};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "afdb_eval.json";

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub evaluation: EvaluationConfig,
    pub batch: BatchConfig,
}

/// Where ground truth and predictions live, and how result files are picked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding `<record>.hea` and `<record>.<annotator>` files
    pub ground_truth_root: PathBuf,
    /// Directory scanned for prediction result files
    pub predictions_dir: PathBuf,
    /// Substring a file name must contain to be treated as a result file
    pub filename_marker: String,
    /// Annotation file extension (annotator name)
    pub annotator: String,
    /// Number of leading file-name characters forming the record id
    pub record_id_len: usize,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            ground_truth_root: PathBuf::from("files"),
            predictions_dir: PathBuf::from("hmm"),
            filename_marker: "traceback".to_string(),
            annotator: "atr".to_string(),
            record_id_len: 5,
        }
    }
}

/// Evaluator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Upper bound on raw samples scanned per window
    pub window_cap: usize,
    /// How mismatched windows are assigned to FP/FN
    pub convention: LabelConvention,
    /// Subtracted from every prediction label as it is read
    pub label_offset: i64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            window_cap: DEFAULT_WINDOW_CAP,
            convention: LabelConvention::Reference,
            label_offset: 0,
        }
    }
}

/// Batch driver behaviour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub failure_policy: FailurePolicy,
    pub format: ReportFormat,
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// Falls back to defaults (with a warning) when the file is missing or
    /// cannot be parsed.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(&path) {
            Ok(config) => {
                log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                config
            }
            Err(err) => {
                log::warn!("[Config] {}. Using defaults.", err);
                Self::default()
            }
        }
    }

    /// Load and validate configuration, failing on any problem
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, InputError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| InputError::Io {
            path: path.display().to_string(),
            details: err.to_string(),
        })?;
        Self::from_json(&contents)
    }

    /// Parse configuration from a JSON string and validate it
    pub fn from_json(data: &str) -> Result<Self, InputError> {
        let config: AppConfig =
            serde_json::from_str(data).map_err(|err| InputError::InvalidConfig {
                field: "<json>".to_string(),
                reason: err.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration from `afdb_eval.json` in the working directory, if any
    pub fn load() -> Self {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            Self::load_from_file(DEFAULT_CONFIG_FILE)
        } else {
            Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.evaluation.window_cap == 0 {
            return Err(invalid("evaluation.window_cap", "must be greater than 0"));
        }
        if self.paths.record_id_len == 0 {
            return Err(invalid("paths.record_id_len", "must be greater than 0"));
        }
        if self.paths.filename_marker.is_empty() {
            return Err(invalid("paths.filename_marker", "must not be empty"));
        }
        if self.paths.annotator.is_empty() {
            return Err(invalid("paths.annotator", "must not be empty"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> InputError {
    InputError::InvalidConfig {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.evaluation.window_cap, 256);
        assert_eq!(config.evaluation.convention, LabelConvention::Reference);
        assert_eq!(config.evaluation.label_offset, 0);
        assert_eq!(config.paths.filename_marker, "traceback");
        assert_eq!(config.paths.record_id_len, 5);
        assert_eq!(config.batch.failure_policy, FailurePolicy::Abort);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed = AppConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let parsed = AppConfig::from_json(
            r#"{ "paths": { "predictions_dir": "out/hmm" }, "evaluation": { "label_offset": 1 } }"#,
        )
        .unwrap();
        assert_eq!(parsed.paths.predictions_dir, PathBuf::from("out/hmm"));
        assert_eq!(parsed.paths.filename_marker, "traceback");
        assert_eq!(parsed.evaluation.label_offset, 1);
        assert_eq!(parsed.evaluation.window_cap, 256);
    }

    #[test]
    fn test_zero_window_cap_rejected() {
        let err = AppConfig::from_json(r#"{ "evaluation": { "window_cap": 0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            InputError::InvalidConfig { ref field, .. } if field == "evaluation.window_cap"
        ));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_file("/nonexistent/afdb_eval.json");
        assert_eq!(config, AppConfig::default());
    }
}

// Input error types for record stores, prediction files and configuration

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Input error code constants
///
/// Error code range: 2001-2006
pub struct InputErrorCodes {}

impl InputErrorCodes {
    /// Ground-truth store has no data for the record
    pub const MISSING_RECORDING: i32 = 2001;

    /// Record header could not be parsed
    pub const MALFORMED_HEADER: i32 = 2002;

    /// Annotation stream is truncated or corrupt
    pub const MALFORMED_ANNOTATION: i32 = 2003;

    /// Prediction file has a bad line or no labels
    pub const MALFORMED_PREDICTION_FILE: i32 = 2004;

    /// Underlying filesystem error
    pub const IO: i32 = 2005;

    /// Configuration rejected by validation
    pub const INVALID_CONFIG: i32 = 2006;
}

/// Log an input error with structured context
pub fn log_input_error(err: &InputError, context: &str) {
    error!(
        "Input error in {}: code={}, component=Readers, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised while reading ground truth, predictions or config
///
/// Error code ranges: 2001-2006
#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    /// No header/annotation for the derived record identifier
    MissingRecording { record_id: String, path: String },

    /// Header line missing fields or carrying a bad sample count
    MalformedHeader { path: String, reason: String },

    /// Annotation file ended mid-record
    MalformedAnnotation { path: String, reason: String },

    /// Prediction line is not an integer, or file has no labels
    MalformedPredictionFile {
        path: String,
        line: Option<usize>,
        reason: String,
    },

    /// Filesystem error other than a missing record
    Io { path: String, details: String },

    /// Configuration value out of range
    InvalidConfig { field: String, reason: String },
}

impl ErrorCode for InputError {
    fn code(&self) -> i32 {
        match self {
            InputError::MissingRecording { .. } => InputErrorCodes::MISSING_RECORDING,
            InputError::MalformedHeader { .. } => InputErrorCodes::MALFORMED_HEADER,
            InputError::MalformedAnnotation { .. } => InputErrorCodes::MALFORMED_ANNOTATION,
            InputError::MalformedPredictionFile { .. } => {
                InputErrorCodes::MALFORMED_PREDICTION_FILE
            }
            InputError::Io { .. } => InputErrorCodes::IO,
            InputError::InvalidConfig { .. } => InputErrorCodes::INVALID_CONFIG,
        }
    }

    fn message(&self) -> String {
        match self {
            InputError::MissingRecording { record_id, path } => {
                format!("Recording '{}' not found ({})", record_id, path)
            }
            InputError::MalformedHeader { path, reason } => {
                format!("Malformed header {}: {}", path, reason)
            }
            InputError::MalformedAnnotation { path, reason } => {
                format!("Malformed annotation file {}: {}", path, reason)
            }
            InputError::MalformedPredictionFile { path, line, reason } => match line {
                Some(line) => format!("Malformed prediction file {}:{}: {}", path, line, reason),
                None => format!("Malformed prediction file {}: {}", path, reason),
            },
            InputError::Io { path, details } => format!("I/O error on {}: {}", path, details),
            InputError::InvalidConfig { field, reason } => {
                format!("Invalid config value for {}: {}", field, reason)
            }
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InputError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for InputError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_codes() {
        let missing = InputError::MissingRecording {
            record_id: "04015".to_string(),
            path: "db/04015.hea".to_string(),
        };
        assert_eq!(missing.code(), InputErrorCodes::MISSING_RECORDING);

        let malformed = InputError::MalformedPredictionFile {
            path: "p.csv".to_string(),
            line: Some(3),
            reason: "x".to_string(),
        };
        assert_eq!(malformed.code(), 2004);

        let config = InputError::InvalidConfig {
            field: "window_cap".to_string(),
            reason: "must be > 0".to_string(),
        };
        assert_eq!(config.code(), 2006);
    }

    #[test]
    fn test_prediction_message_includes_line() {
        let err = InputError::MalformedPredictionFile {
            path: "04015_traceback.csv".to_string(),
            line: Some(7),
            reason: "invalid digit found in string".to_string(),
        };
        assert_eq!(
            err.message(),
            "Malformed prediction file 04015_traceback.csv:7: invalid digit found in string"
        );

        let err = InputError::MalformedPredictionFile {
            path: "empty.csv".to_string(),
            line: None,
            reason: "no labels after header".to_string(),
        };
        assert_eq!(
            err.message(),
            "Malformed prediction file empty.csv: no labels after header"
        );
    }

    #[test]
    fn test_input_error_display() {
        let err = InputError::Io {
            path: "db".to_string(),
            details: "permission denied".to_string(),
        };
        let display = format!("{}", err);
        assert!(display.contains("InputError"));
        assert!(display.contains("2005"));
    }
}

// Evaluator error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Evaluation error code constants
///
/// Error code range: 1001-1004
pub struct EvaluationErrorCodes {}

impl EvaluationErrorCodes {
    /// Signal has no samples
    pub const EMPTY_SIGNAL: i32 = 1001;

    /// Prediction sequence has no windows
    pub const EMPTY_PREDICTIONS: i32 = 1002;

    /// More prediction windows than raw samples
    pub const DEGENERATE_OVERLAP: i32 = 1003;

    /// Annotated event lies outside the signal
    pub const EVENT_OUT_OF_RANGE: i32 = 1004;
}

/// Log an evaluation error with structured context
pub fn log_evaluation_error(err: &EvaluationError, context: &str) {
    error!(
        "Evaluation error in {}: code={}, component=Evaluator, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Evaluator input errors
///
/// These are raised before any window is classified; a run that returns
/// one of them has produced no tally at all.
///
/// Error code ranges: 1001-1004
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// Signal length is zero
    EmptySignal,

    /// No prediction windows were supplied
    EmptyPredictions,

    /// `signal_length / windows` rounds down to zero raw samples per window
    DegenerateOverlap {
        signal_length: usize,
        windows: usize,
    },

    /// Event sample index is not inside `[0, signal_length)`
    EventOutOfRange { index: usize, signal_length: usize },
}

impl ErrorCode for EvaluationError {
    fn code(&self) -> i32 {
        match self {
            EvaluationError::EmptySignal => EvaluationErrorCodes::EMPTY_SIGNAL,
            EvaluationError::EmptyPredictions => EvaluationErrorCodes::EMPTY_PREDICTIONS,
            EvaluationError::DegenerateOverlap { .. } => EvaluationErrorCodes::DEGENERATE_OVERLAP,
            EvaluationError::EventOutOfRange { .. } => EvaluationErrorCodes::EVENT_OUT_OF_RANGE,
        }
    }

    fn message(&self) -> String {
        match self {
            EvaluationError::EmptySignal => "Signal contains no samples".to_string(),
            EvaluationError::EmptyPredictions => "Prediction sequence is empty".to_string(),
            EvaluationError::DegenerateOverlap {
                signal_length,
                windows,
            } => format!(
                "{} prediction windows exceed {} raw samples (overlap would be 0)",
                windows, signal_length
            ),
            EvaluationError::EventOutOfRange {
                index,
                signal_length,
            } => format!(
                "Event at sample {} is outside signal of length {}",
                index, signal_length
            ),
        }
    }
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EvaluationError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for EvaluationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_error_codes() {
        assert_eq!(
            EvaluationError::EmptySignal.code(),
            EvaluationErrorCodes::EMPTY_SIGNAL
        );
        assert_eq!(
            EvaluationError::EmptyPredictions.code(),
            EvaluationErrorCodes::EMPTY_PREDICTIONS
        );
        assert_eq!(
            EvaluationError::DegenerateOverlap {
                signal_length: 10,
                windows: 20
            }
            .code(),
            1003
        );
        assert_eq!(
            EvaluationError::EventOutOfRange {
                index: 12,
                signal_length: 10
            }
            .code(),
            1004
        );
    }

    #[test]
    fn test_degenerate_overlap_message() {
        let err = EvaluationError::DegenerateOverlap {
            signal_length: 10,
            windows: 20,
        };
        assert_eq!(
            err.message(),
            "20 prediction windows exceed 10 raw samples (overlap would be 0)"
        );
    }

    #[test]
    fn test_evaluation_error_display() {
        let err = EvaluationError::EmptyPredictions;
        let display = format!("{}", err);
        assert!(display.contains("EvaluationError"));
        assert!(display.contains(&err.code().to_string()));
    }
}

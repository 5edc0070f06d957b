// Error types for the AFDB evaluation tool
//
// This module defines custom error types for the evaluator and for the
// record/prediction readers, with stable numeric codes so the CLI and any
// wrapping scripts can tell failure kinds apart.

mod evaluation;
mod input;

pub use evaluation::{log_evaluation_error, EvaluationError, EvaluationErrorCodes};
pub use input::{log_input_error, InputError, InputErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

//! Per-window prediction files.
//!
//! A result file starts with one header line, followed by one integer
//! label per prediction window in window order.

use std::fs;
use std::path::Path;

use crate::error::InputError;

/// Read labels from a result file, subtracting `label_offset` from each.
pub fn read_predictions<P: AsRef<Path>>(
    path: P,
    label_offset: i64,
) -> Result<Vec<i64>, InputError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|err| InputError::Io {
        path: path.display().to_string(),
        details: err.to_string(),
    })?;
    parse_predictions(&contents, label_offset).map_err(|err| match err {
        InputError::MalformedPredictionFile { line, reason, .. } => {
            InputError::MalformedPredictionFile {
                path: path.display().to_string(),
                line,
                reason,
            }
        }
        other => other,
    })
}

/// Parse result file contents. Line numbers in errors are 1-based and
/// count the header.
pub fn parse_predictions(contents: &str, label_offset: i64) -> Result<Vec<i64>, InputError> {
    let mut labels = Vec::new();
    let mut pending_blank = None;

    for (idx, raw) in contents.lines().enumerate().skip(1) {
        let line = raw.trim();
        if line.is_empty() {
            pending_blank.get_or_insert(idx + 1);
            continue;
        }
        if let Some(blank) = pending_blank {
            return Err(malformed(Some(blank), "blank line between labels"));
        }
        let label = line
            .parse::<i64>()
            .map_err(|err| malformed(Some(idx + 1), &format!("'{line}': {err}")))?;
        let label = label
            .checked_sub(label_offset)
            .ok_or_else(|| malformed(Some(idx + 1), "label out of range after offset"))?;
        labels.push(label);
    }

    if labels.is_empty() {
        return Err(malformed(None, "no labels after header"));
    }
    Ok(labels)
}

fn malformed(line: Option<usize>, reason: &str) -> InputError {
    InputError::MalformedPredictionFile {
        path: "<input>".to_string(),
        line,
        reason: reason.to_string(),
    }
}

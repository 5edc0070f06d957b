// Ground-truth densification and window resampling

use std::collections::BTreeSet;

use crate::error::EvaluationError;

/// Expand an event index set into a 0/1 vector of `signal_length` samples.
pub fn dense_ground_truth(
    signal_length: usize,
    events: &BTreeSet<usize>,
) -> Result<Vec<u8>, EvaluationError> {
    if signal_length == 0 {
        return Err(EvaluationError::EmptySignal);
    }

    let mut dense = vec![0u8; signal_length];
    for &index in events {
        match dense.get_mut(index) {
            Some(slot) => *slot = 1,
            None => {
                return Err(EvaluationError::EventOutOfRange {
                    index,
                    signal_length,
                })
            }
        }
    }
    Ok(dense)
}

/// Raw samples represented by one prediction window: `floor(N / M)`.
pub fn overlap(signal_length: usize, windows: usize) -> Result<usize, EvaluationError> {
    if signal_length == 0 {
        return Err(EvaluationError::EmptySignal);
    }
    if windows == 0 {
        return Err(EvaluationError::EmptyPredictions);
    }

    match signal_length / windows {
        0 => Err(EvaluationError::DegenerateOverlap {
            signal_length,
            windows,
        }),
        overlap => Ok(overlap),
    }
}

/// Collapse the dense vector into `windows` values using a max reduction.
///
/// Window `j` starts at `j * overlap` but always spans at most `window_cap`
/// raw samples, independent of the overlap, and is clipped at the end of
/// the signal.
pub fn resample(
    dense: &[u8],
    windows: usize,
    window_cap: usize,
) -> Result<Vec<u8>, EvaluationError> {
    let step = overlap(dense.len(), windows)?;

    let resampled = (0..windows)
        .map(|j| {
            let start = j * step;
            let end = start.saturating_add(window_cap).min(dense.len());
            dense[start..end].iter().copied().max().unwrap_or(0)
        })
        .collect();
    Ok(resampled)
}

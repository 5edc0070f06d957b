//! Ground-truth store seam.
//!
//! The evaluator only needs two facts about a recording: how many raw
//! samples it has and at which samples events were annotated. Stores hide
//! where those come from; [`WfdbStore`] reads them from a PhysioNet-style
//! directory of `.hea` headers and MIT-format annotation files.

mod wfdb;


use std::collections::{BTreeSet, HashMap};

use crate::error::InputError;

pub use wfdb::{parse_annotations, parse_header, HeaderInfo, WfdbStore, DEFAULT_ANNOTATOR};

/// Ground truth for one recording.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundTruth {
    pub record_id: String,
    /// Raw sample count N
    pub signal_length: usize,
    pub sampling_frequency: Option<f64>,
    /// Annotated event sample indices
    pub events: BTreeSet<usize>,
}

/// Source of ground truth keyed by record identifier.
pub trait GroundTruthStore {
    fn load(&self, record_id: &str) -> Result<GroundTruth, InputError>;
}

/// Store backed by a map, for callers that already hold the data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: HashMap<String, GroundTruth>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, truth: GroundTruth) {
        self.records.insert(truth.record_id.clone(), truth);
    }

    pub fn with_record(
        mut self,
        record_id: &str,
        signal_length: usize,
        events: impl IntoIterator<Item = usize>,
    ) -> Self {
        self.insert(GroundTruth {
            record_id: record_id.to_string(),
            signal_length,
            sampling_frequency: None,
            events: events.into_iter().collect(),
        });
        self
    }
}

impl GroundTruthStore for InMemoryStore {
    fn load(&self, record_id: &str) -> Result<GroundTruth, InputError> {
        self.records
            .get(record_id)
            .cloned()
            .ok_or_else(|| InputError::MissingRecording {
                record_id: record_id.to_string(),
                path: "<memory>".to_string(),
            })
    }
}

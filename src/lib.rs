// AFDB evaluation core
// Window-level sensitivity/specificity of sequence-labeling output against
// annotated physiological records

pub mod batch;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod predictions;
pub mod records;

pub use batch::{BatchDriver, BatchSummary, FailurePolicy, RecordReport, ReportFormat};
pub use config::AppConfig;
pub use evaluation::{evaluate, ConfusionTally, Evaluation, Evaluator, LabelConvention, Outcome};
pub use records::{GroundTruth, GroundTruthStore, WfdbStore};

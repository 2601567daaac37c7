pub mod batch;
pub mod config;
pub mod discovery;
pub mod result;
pub mod types;

pub use batch::{process_batch, process_file, run_batch, BatchContext, ProcessingError, ScoredFile};
pub use types::{BatchStage, NoOpReporter, ProgressReporter};

/// Batch processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchStage {
    Discovery,
    Scoring,
}

impl std::fmt::Display for BatchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discovery => write!(f, "Finding images"),
            Self::Scoring => write!(f, "Scoring images"),
        }
    }
}

/// Thread-safe progress reporting for a batch.
///
/// All methods default to no-ops.
pub trait ProgressReporter: Send + Sync {
    /// A stage has started. `total_items` is the number of files, if known.
    fn begin_stage(&self, _stage: BatchStage, _total_items: Option<usize>) {}

    /// `items_done` files of the current stage have been handled.
    fn advance(&self, _items_done: usize) {}

    fn finish_stage(&self) {}
}

pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

//! Outcome bookkeeping for batch comment deletion.

use serde::Serialize;

use crate::status::AnalysisStatus;
use crate::types::DbId;

/// One comment that could not be removed during a batch deletion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletionFailure {
    pub analyzed_comment_id: DbId,
    pub youtube_comment_id: String,
    pub reason: String,
}

/// Aggregate result of a batch deletion request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchDeletionSummary {
    pub total_targeted: usize,
    pub successfully_deleted: usize,
    pub failed_to_delete: usize,
    pub failures: Vec<DeletionFailure>,
}

impl BatchDeletionSummary {
    /// Record a successful deletion.
    pub fn record_success(&mut self) {
        self.total_targeted += 1;
        self.successfully_deleted += 1;
    }

    /// Record a failed deletion with its reason.
    pub fn record_failure(&mut self, failure: DeletionFailure) {
        self.total_targeted += 1;
        self.failed_to_delete += 1;
        self.failures.push(failure);
    }

    /// Final analysis status implied by the recorded outcomes.
    pub fn final_status(&self) -> AnalysisStatus {
        status_after_batch_deletion(self.successfully_deleted, self.failed_to_delete)
    }
}

/// Map per-comment outcomes onto the terminal analysis status.
///
/// Nothing targeted leaves the analysis `COMPLETED`.
pub fn status_after_batch_deletion(succeeded: usize, failed: usize) -> AnalysisStatus {
    match (succeeded, failed) {
        (0, 0) => AnalysisStatus::Completed,
        (_, 0) => AnalysisStatus::CompletedAllDeletionsSuccessfully,
        (0, _) => AnalysisStatus::FailedAllDeletions,
        _ => AnalysisStatus::CompletedDeletionWithPartialErrors,
    }
}

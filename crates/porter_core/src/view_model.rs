use crate::format::ConversionTarget;
use crate::state::{
    BatchVerdict, ConversionOutcome, FileMeta, FileResultKind, JobId, SessionState, Stage,
};

/// Feedback for the last add-files action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntakeStats {
    pub added: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStatusView {
    pub available: bool,
    pub detail: String,
}

/// Aggregate batch progress, recomputed after each file completes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchProgressView {
    pub total_files: usize,
    pub completed_files: usize,
    pub current_file: Option<String>,
    pub overall_percent: u8,
    pub status_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub file_name: String,
    pub stage: Stage,
    pub outcome: Option<FileResultKind>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub server: Option<ServerStatusView>,
    pub pending: Vec<FileMeta>,
    pub target: Option<ConversionTarget>,
    pub progress: BatchProgressView,
    pub jobs: Vec<JobRowView>,
    /// Most-recent-first, capped at the configured history length.
    pub history: Vec<ConversionOutcome>,
    pub intake: Option<IntakeStats>,
    pub notice: Option<String>,
    pub verdict: Option<BatchVerdict>,
    pub dirty: bool,
}

use std::collections::VecDeque;

use crate::format::{self, ConversionTarget};
use crate::view_model::{AppViewModel, BatchProgressView, IntakeStats, JobRowView, ServerStatusView};

pub type JobId = u64;

/// Orchestrator lifecycle. `Idle` is both initial and terminal; the cycle
/// repeats once per batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Settling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Queued,
    Uploading,
    Downloading,
    Writing,
    Done,
}

/// Orchestrator-side view of a user-supplied file: declared name plus size.
/// The bytes themselves never enter the pure core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub name: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileResultKind {
    Success,
    Failed,
}

/// Terminal record for one file's conversion attempt. Immutable once
/// appended to history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    pub file_name: String,
    pub target: ConversionTarget,
    pub succeeded: bool,
    pub error_message: Option<String>,
    pub completed_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchVerdict {
    AllSucceeded,
    AllFailed,
    Partial { succeeded: usize, failed: usize },
}

pub const DEFAULT_HISTORY_CAP: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
struct JobEntry {
    job_id: JobId,
    file_name: String,
    stage: Stage,
    result: Option<FileResultKind>,
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    session: SessionState,
    server: Option<(bool, String)>,
    pending: Vec<FileMeta>,
    target: Option<ConversionTarget>,
    jobs: Vec<JobEntry>,
    completed_files: usize,
    status_text: String,
    verdict: Option<BatchVerdict>,
    intake: Option<IntakeStats>,
    notice: Option<String>,
    history: VecDeque<ConversionOutcome>,
    history_cap: usize,
    next_job_id: JobId,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_history_cap(DEFAULT_HISTORY_CAP)
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history_cap(cap: usize) -> Self {
        Self {
            session: SessionState::Idle,
            server: None,
            pending: Vec::new(),
            target: None,
            jobs: Vec::new(),
            completed_files: 0,
            status_text: String::new(),
            verdict: None,
            intake: None,
            notice: None,
            history: VecDeque::new(),
            history_cap: cap.max(1),
            next_job_id: 1,
            dirty: false,
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn view(&self) -> AppViewModel {
        let current_file = if self.session == SessionState::Running {
            // Files run strictly in input order; the first job without a
            // result is the one in flight.
            self.jobs
                .iter()
                .find(|job| job.result.is_none())
                .map(|job| job.file_name.clone())
        } else {
            None
        };

        AppViewModel {
            session: self.session,
            server: self
                .server
                .as_ref()
                .map(|(available, detail)| ServerStatusView {
                    available: *available,
                    detail: detail.clone(),
                }),
            pending: self.pending.clone(),
            target: self.target,
            progress: BatchProgressView {
                total_files: self.jobs.len(),
                completed_files: self.completed_files,
                current_file,
                overall_percent: overall_percent(self.completed_files, self.jobs.len()),
                status_text: self.status_text.clone(),
            },
            jobs: self
                .jobs
                .iter()
                .map(|job| JobRowView {
                    job_id: job.job_id,
                    file_name: job.file_name.clone(),
                    stage: job.stage,
                    outcome: job.result,
                    error: job.error.clone(),
                })
                .collect(),
            history: self.history.iter().cloned().collect(),
            intake: self.intake,
            notice: self.notice.clone(),
            verdict: self.verdict,
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        was_dirty
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_notice(&mut self, text: impl Into<String>) {
        self.notice = Some(text.into());
        self.mark_dirty();
    }

    pub(crate) fn set_server_status(&mut self, available: bool, detail: String) {
        self.server = Some((available, detail));
        self.mark_dirty();
    }

    /// Screens and appends files to the pending selection. Files without an
    /// accepted extension, files over the upload limit and duplicate names
    /// are rejected.
    pub(crate) fn add_files(&mut self, files: Vec<FileMeta>) -> IntakeStats {
        let mut stats = IntakeStats::default();
        for file in files {
            let screened = format::is_accepted_name(&file.name)
                && file.size_bytes <= format::MAX_FILE_BYTES
                && !self.pending.iter().any(|p| p.name == file.name);
            if screened {
                self.pending.push(file);
                stats.added += 1;
            } else {
                stats.rejected += 1;
            }
        }
        self.notice = None;
        self.intake = Some(stats);
        self.mark_dirty();
        stats
    }

    pub(crate) fn remove_file(&mut self, name: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|file| file.name != name);
        let removed = self.pending.len() != before;
        if removed {
            self.notice = None;
            self.mark_dirty();
        }
        removed
    }

    pub(crate) fn set_target(&mut self, target: ConversionTarget) {
        self.target = Some(target);
        self.notice = None;
        self.mark_dirty();
    }

    pub(crate) fn has_selection(&self) -> bool {
        !self.pending.is_empty()
    }

    pub(crate) fn target(&self) -> Option<ConversionTarget> {
        self.target
    }

    /// Moves the pending selection into a running batch and returns the
    /// `(job_id, file_name)` pairs in input order.
    pub(crate) fn start_batch(&mut self) -> Vec<(JobId, String)> {
        let mut next_id = self.next_job_id;
        self.jobs = self
            .pending
            .iter()
            .map(|file| {
                let job_id = next_id;
                next_id += 1;
                JobEntry {
                    job_id,
                    file_name: file.name.clone(),
                    stage: Stage::Queued,
                    result: None,
                    error: None,
                }
            })
            .collect();
        self.next_job_id = next_id;
        self.completed_files = 0;
        self.verdict = None;
        self.notice = None;
        self.session = SessionState::Running;
        self.status_text = format!(
            "Converting {} file(s) to {}",
            self.jobs.len(),
            self.target.map(|t| t.code()).unwrap_or("?")
        );
        self.mark_dirty();
        self.jobs
            .iter()
            .map(|job| (job.job_id, job.file_name.clone()))
            .collect()
    }

    pub(crate) fn apply_progress(&mut self, job_id: JobId, stage: Stage) {
        if self.session != SessionState::Running {
            return;
        }
        if let Some(job) = self.jobs.iter_mut().find(|job| job.job_id == job_id) {
            if job.result.is_none() {
                job.stage = stage;
                self.mark_dirty();
            }
        }
    }

    /// Records a per-file outcome, advances the aggregate counters and
    /// appends to history. Returns true when this completion finished the
    /// batch and the state entered `Settling`.
    pub(crate) fn apply_finished(
        &mut self,
        job_id: JobId,
        result: FileResultKind,
        error_message: Option<String>,
        completed_at: String,
    ) -> bool {
        if self.session != SessionState::Running {
            return false;
        }
        let Some(target) = self.target else {
            return false;
        };
        let file_name = {
            let Some(job) = self.jobs.iter_mut().find(|job| job.job_id == job_id) else {
                return false;
            };
            if job.result.is_some() {
                // Duplicate completion for an already-settled job.
                return false;
            }
            job.result = Some(result);
            job.stage = Stage::Done;
            job.error = error_message.clone();
            job.file_name.clone()
        };

        self.completed_files += 1;
        self.push_history(ConversionOutcome {
            file_name,
            target,
            succeeded: result == FileResultKind::Success,
            error_message,
            completed_at,
        });

        let settled = self.completed_files == self.jobs.len();
        if settled {
            self.settle();
        } else {
            self.status_text = format!(
                "Converted {} of {} file(s)",
                self.completed_files,
                self.jobs.len()
            );
        }
        self.mark_dirty();
        settled
    }

    fn push_history(&mut self, outcome: ConversionOutcome) {
        self.history.push_front(outcome);
        self.history.truncate(self.history_cap);
    }

    fn settle(&mut self) {
        let total = self.jobs.len();
        let failed = self
            .jobs
            .iter()
            .filter(|job| job.result == Some(FileResultKind::Failed))
            .count();
        let succeeded = total - failed;
        let verdict = if failed == 0 {
            BatchVerdict::AllSucceeded
        } else if succeeded == 0 {
            BatchVerdict::AllFailed
        } else {
            BatchVerdict::Partial { succeeded, failed }
        };
        self.verdict = Some(verdict);
        self.session = SessionState::Settling;
        self.status_text = match verdict {
            BatchVerdict::AllSucceeded => format!("All {total} conversion(s) succeeded"),
            BatchVerdict::AllFailed => format!("All {total} conversion(s) failed"),
            BatchVerdict::Partial { succeeded, failed } => {
                format!("Converted {succeeded} of {total} file(s) ({failed} failed)")
            }
        };
    }

    /// Settle delay elapsed: discard the selection and target, clear the
    /// aggregate progress and return to `Idle`. History is kept.
    pub(crate) fn settle_elapsed(&mut self) {
        if self.session != SessionState::Settling {
            return;
        }
        self.pending.clear();
        self.target = None;
        self.jobs.clear();
        self.completed_files = 0;
        self.status_text.clear();
        self.verdict = None;
        self.intake = None;
        self.session = SessionState::Idle;
        self.mark_dirty();
    }

    pub(crate) fn reset_selection(&mut self) {
        self.pending.clear();
        self.target = None;
        self.intake = None;
        self.notice = None;
        self.mark_dirty();
    }
}

fn overall_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u8
    }
}

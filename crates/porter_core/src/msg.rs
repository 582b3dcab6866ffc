#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Front end came up; kick off the server status probe.
    AppStarted,
    /// Result of the server status probe.
    ServerProbed { available: bool, detail: String },
    /// User picked files for the pending selection.
    FilesAdded(Vec<crate::FileMeta>),
    /// User removed one pending file by name.
    FileRemoved { name: String },
    /// User chose the target format for the next batch.
    TargetSelected(crate::ConversionTarget),
    /// User asked to convert the current selection.
    ConvertClicked,
    /// User cleared the selection without converting.
    ResetClicked,
    /// Client-side stage change for an in-flight file.
    FileProgress {
        job_id: crate::JobId,
        stage: crate::Stage,
    },
    /// Terminal result for one file.
    FileFinished {
        job_id: crate::JobId,
        result: crate::FileResultKind,
        error_message: Option<String>,
        completed_at: String,
    },
    /// The post-batch settle delay elapsed.
    SettleElapsed,
    /// Fallback for placeholder wiring.
    NoOp,
}

//! Porter core: pure batch-conversion state machine and view-model helpers.
mod effect;
mod format;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use format::{
    compatible_targets, file_extension, is_accepted_name, recommended_target, ConversionTarget,
    ACCEPTED_EXTENSIONS, MAX_FILE_BYTES,
};
pub use msg::Msg;
pub use state::{
    AppState, BatchVerdict, ConversionOutcome, FileMeta, FileResultKind, JobId, SessionState,
    Stage, DEFAULT_HISTORY_CAP,
};
pub use update::update;
pub use view_model::{
    AppViewModel, BatchProgressView, IntakeStats, JobRowView, ServerStatusView,
};

use crate::{AppState, Effect, Msg, SessionState};

const BUSY_NOTICE: &str = "a conversion is already in progress";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::AppStarted => vec![Effect::ProbeServer],
        Msg::ServerProbed { available, detail } => {
            state.set_server_status(available, detail);
            Vec::new()
        }
        Msg::FilesAdded(files) => {
            if files.is_empty() {
                return (state, Vec::new());
            }
            if state.session() != SessionState::Idle {
                state.set_notice(BUSY_NOTICE);
                return (state, Vec::new());
            }
            state.add_files(files);
            Vec::new()
        }
        Msg::FileRemoved { name } => {
            if state.session() == SessionState::Idle {
                state.remove_file(&name);
            }
            Vec::new()
        }
        Msg::TargetSelected(target) => {
            // The target is immutable for a running batch.
            if state.session() == SessionState::Idle {
                state.set_target(target);
            }
            Vec::new()
        }
        Msg::ConvertClicked => {
            if state.session() != SessionState::Idle {
                state.set_notice(BUSY_NOTICE);
                return (state, Vec::new());
            }
            if !state.has_selection() {
                state.set_notice("select at least one file first");
                return (state, Vec::new());
            }
            let Some(target) = state.target() else {
                state.set_notice("choose a target format first");
                return (state, Vec::new());
            };
            state
                .start_batch()
                .into_iter()
                .map(|(job_id, file_name)| Effect::ConvertFile {
                    job_id,
                    file_name,
                    target,
                })
                .collect()
        }
        Msg::ResetClicked => {
            if state.session() == SessionState::Idle {
                state.reset_selection();
            }
            Vec::new()
        }
        Msg::FileProgress { job_id, stage } => {
            state.apply_progress(job_id, stage);
            Vec::new()
        }
        Msg::FileFinished {
            job_id,
            result,
            error_message,
            completed_at,
        } => {
            if state.apply_finished(job_id, result, error_message, completed_at) {
                vec![Effect::ScheduleSettle]
            } else {
                Vec::new()
            }
        }
        Msg::SettleElapsed => {
            state.settle_elapsed();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

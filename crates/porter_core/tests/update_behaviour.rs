use std::sync::Once;

use porter_core::{
    update, AppState, ConversionTarget, Effect, FileMeta, FileResultKind, Msg, SessionState,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(client_logging::initialize_for_tests);
}

fn meta(name: &str) -> FileMeta {
    FileMeta {
        name: name.to_string(),
        size_bytes: 1024,
    }
}

fn ready_state(names: &[&str], target: ConversionTarget) -> AppState {
    let state = AppState::new();
    let (state, _) = update(state, Msg::FilesAdded(names.iter().map(|n| meta(n)).collect()));
    let (state, _) = update(state, Msg::TargetSelected(target));
    state
}

fn finish(state: AppState, job_id: u64, result: FileResultKind) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::FileFinished {
            job_id,
            result,
            error_message: None,
            completed_at: "2026-08-07 10:00:00".to_string(),
        },
    )
}

#[test]
fn app_started_probes_the_server() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::AppStarted);

    assert_eq!(effects, vec![Effect::ProbeServer]);
    assert_eq!(state.session(), SessionState::Idle);
}

#[test]
fn server_probe_updates_the_banner() {
    init_logging();
    let (mut state, _) = update(
        AppState::new(),
        Msg::ServerProbed {
            available: false,
            detail: "conversion service reports itself unavailable".to_string(),
        },
    );

    let view = state.view();
    let server = view.server.expect("server status");
    assert!(!server.available);
    assert_eq!(server.detail, "conversion service reports itself unavailable");
    assert!(state.consume_dirty());
}

#[test]
fn intake_screens_extension_size_and_duplicates() {
    init_logging();
    let files = vec![
        meta("report.pdf"),
        meta("image.png"),
        FileMeta {
            name: "big.docx".to_string(),
            size_bytes: 17 * 1024 * 1024,
        },
        meta("report.pdf"),
    ];
    let (state, effects) = update(AppState::new(), Msg::FilesAdded(files));

    assert!(effects.is_empty());
    let view = state.view();
    let intake = view.intake.expect("intake stats");
    assert_eq!(intake.added, 1);
    assert_eq!(intake.rejected, 3);
    assert_eq!(view.pending.len(), 1);
    assert_eq!(view.pending[0].name, "report.pdf");
}

#[test]
fn convert_without_files_reports_a_notice() {
    init_logging();
    let state = AppState::new();
    let (state, _) = update(state, Msg::TargetSelected(ConversionTarget::Markdown));
    let (state, effects) = update(state, Msg::ConvertClicked);

    assert!(effects.is_empty());
    assert_eq!(state.session(), SessionState::Idle);
    assert_eq!(
        state.view().notice.as_deref(),
        Some("select at least one file first")
    );
}

#[test]
fn convert_without_target_reports_a_notice() {
    init_logging();
    let state = AppState::new();
    let (state, _) = update(state, Msg::FilesAdded(vec![meta("notes.txt")]));
    let (state, effects) = update(state, Msg::ConvertClicked);

    assert!(effects.is_empty());
    assert_eq!(state.session(), SessionState::Idle);
    assert_eq!(
        state.view().notice.as_deref(),
        Some("choose a target format first")
    );
}

#[test]
fn start_batch_emits_convert_effects_in_input_order() {
    init_logging();
    let state = ready_state(&["b.docx", "a.pdf"], ConversionTarget::Markdown);
    let (state, effects) = update(state, Msg::ConvertClicked);

    assert_eq!(
        effects,
        vec![
            Effect::ConvertFile {
                job_id: 1,
                file_name: "b.docx".to_string(),
                target: ConversionTarget::Markdown,
            },
            Effect::ConvertFile {
                job_id: 2,
                file_name: "a.pdf".to_string(),
                target: ConversionTarget::Markdown,
            },
        ]
    );

    let view = state.view();
    assert_eq!(view.session, SessionState::Running);
    assert_eq!(view.progress.total_files, 2);
    assert_eq!(view.progress.completed_files, 0);
    assert_eq!(view.progress.overall_percent, 0);
    assert_eq!(view.progress.current_file.as_deref(), Some("b.docx"));
}

#[test]
fn convert_clicked_while_running_is_rejected() {
    init_logging();
    let state = ready_state(&["a.pdf", "b.pdf"], ConversionTarget::Text);
    let (state, _) = update(state, Msg::ConvertClicked);
    let (state, _) = finish(state, 1, FileResultKind::Success);
    let before = state.view();

    let (state, effects) = update(state, Msg::ConvertClicked);

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.session, SessionState::Running);
    assert_eq!(view.progress.total_files, before.progress.total_files);
    assert_eq!(view.progress.completed_files, before.progress.completed_files);
    assert_eq!(view.history, before.history);
    assert_eq!(
        view.notice.as_deref(),
        Some("a conversion is already in progress")
    );
}

#[test]
fn files_added_while_running_are_rejected() {
    init_logging();
    let state = ready_state(&["a.pdf"], ConversionTarget::Text);
    let (state, _) = update(state, Msg::ConvertClicked);

    let (state, effects) = update(state, Msg::FilesAdded(vec![meta("late.pdf")]));

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.pending.len(), 1);
    assert_eq!(
        view.notice.as_deref(),
        Some("a conversion is already in progress")
    );
}

#[test]
fn target_is_immutable_while_running() {
    init_logging();
    let state = ready_state(&["a.pdf"], ConversionTarget::Text);
    let (state, _) = update(state, Msg::ConvertClicked);

    let (state, _) = update(state, Msg::TargetSelected(ConversionTarget::Xlsx));

    assert_eq!(state.view().target, Some(ConversionTarget::Text));
}

#[test]
fn remove_file_only_touches_the_named_entry() {
    init_logging();
    let state = ready_state(&["a.pdf", "b.pdf"], ConversionTarget::Text);
    let (state, _) = update(
        state,
        Msg::FileRemoved {
            name: "a.pdf".to_string(),
        },
    );

    let view = state.view();
    assert_eq!(view.pending.len(), 1);
    assert_eq!(view.pending[0].name, "b.pdf");
}

#[test]
fn reset_clears_selection_but_not_history() {
    init_logging();
    let state = ready_state(&["a.pdf"], ConversionTarget::Text);
    let (state, _) = update(state, Msg::ConvertClicked);
    let (state, _) = finish(state, 1, FileResultKind::Success);
    let (state, _) = update(state, Msg::SettleElapsed);
    assert_eq!(state.view().history.len(), 1);

    let (state, _) = update(state, Msg::FilesAdded(vec![meta("c.pdf")]));
    let (state, _) = update(state, Msg::ResetClicked);

    let view = state.view();
    assert!(view.pending.is_empty());
    assert_eq!(view.target, None);
    assert_eq!(view.history.len(), 1);
}

#[test]
fn reset_is_ignored_while_running() {
    init_logging();
    let state = ready_state(&["a.pdf"], ConversionTarget::Text);
    let (state, _) = update(state, Msg::ConvertClicked);

    let (state, _) = update(state, Msg::ResetClicked);

    assert_eq!(state.view().pending.len(), 1);
    assert_eq!(state.view().session, SessionState::Running);
}

#[test]
fn settling_schedules_the_settle_delay_then_returns_to_idle() {
    init_logging();
    let state = ready_state(&["a.pdf"], ConversionTarget::Text);
    let (state, _) = update(state, Msg::ConvertClicked);
    let (state, effects) = finish(state, 1, FileResultKind::Success);

    assert_eq!(effects, vec![Effect::ScheduleSettle]);
    assert_eq!(state.view().session, SessionState::Settling);
    assert_eq!(state.view().progress.current_file, None);

    let (state, effects) = update(state, Msg::SettleElapsed);

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.session, SessionState::Idle);
    assert!(view.pending.is_empty());
    assert_eq!(view.target, None);
    assert_eq!(view.progress.total_files, 0);
    assert_eq!(view.progress.status_text, "");
    assert_eq!(view.history.len(), 1);
}

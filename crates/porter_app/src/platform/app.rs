use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::time::Duration;

use client_logging::client_error;
use porter_client::{ClientEvent, ClientHandle, ConvertSettings};
use porter_core::{
    compatible_targets, file_extension, recommended_target, update, AppState, BatchVerdict,
    ConversionTarget, FileMeta, Msg, SessionState,
};

use super::config;
use super::effects::EffectRunner;
use super::logging::{self, LogDestination};
use super::render::Renderer;
use crate::Args;

pub fn run_app(args: Args) -> ExitCode {
    logging::initialize(if args.log_file {
        LogDestination::Both
    } else {
        LogDestination::Terminal
    });

    if args.init_config {
        return match config::write_default_config(&args.config) {
            Ok(()) => {
                println!("wrote {}", args.config.display());
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("could not write {}: {err}", args.config.display());
                ExitCode::FAILURE
            }
        };
    }

    let mut config = config::load_config(&args.config);
    if let Some(server) = args.server.clone() {
        config.server_url = server;
    }
    if let Some(dir) = args.output_dir.clone() {
        config.output_dir = dir;
    }

    let settings = ConvertSettings {
        base_url: config.server_url.clone(),
        ..ConvertSettings::default()
    };

    if args.list_formats {
        return list_formats(&args.files);
    }
    if args.check {
        return run_check(settings, config.output_dir.clone());
    }

    if args.files.is_empty() {
        eprintln!("no input files; see --help");
        return ExitCode::FAILURE;
    }
    let Some(format_arg) = args.format.as_deref() else {
        eprintln!("missing --format; expected one of markdown, text, pdf, docx, xlsx");
        return ExitCode::FAILURE;
    };
    let Some(target) = ConversionTarget::parse(format_arg) else {
        eprintln!("unknown format {format_arg:?}; expected one of markdown, text, pdf, docx, xlsx");
        return ExitCode::FAILURE;
    };

    // Build the selection: declared name -> path for the effect runner,
    // plus metadata for intake screening.
    let mut file_index = HashMap::new();
    let mut metas = Vec::new();
    for path in &args.files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
            eprintln!("unusable file name: {}", path.display());
            return ExitCode::FAILURE;
        };
        let size_bytes = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(err) => {
                eprintln!("cannot read {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        };
        file_index.insert(name.clone(), path.clone());
        metas.push(FileMeta { name, size_bytes });
    }

    let (msg_tx, msg_rx) = mpsc::channel();
    let runner = EffectRunner::new(
        msg_tx,
        settings,
        config.output_dir.clone(),
        Duration::from_millis(config.settle_delay_ms),
        file_index,
    );

    let mut renderer = Renderer::new();
    let mut state = AppState::with_history_cap(config.history_cap);
    let mut last_verdict: Option<BatchVerdict> = None;

    for msg in [
        Msg::AppStarted,
        Msg::FilesAdded(metas),
        Msg::TargetSelected(target),
        Msg::ConvertClicked,
    ] {
        state = dispatch(state, msg, &runner, &mut renderer, &mut last_verdict);
    }

    if state.session() == SessionState::Idle {
        // The batch never started; the renderer already showed the notice.
        return ExitCode::FAILURE;
    }

    loop {
        // No deadline: a hung conversion stalls the batch by design.
        match msg_rx.recv() {
            Ok(msg) => {
                state = dispatch(state, msg, &runner, &mut renderer, &mut last_verdict);
                if state.session() == SessionState::Idle {
                    break;
                }
            }
            Err(_) => {
                client_error!("effect runner channel closed unexpectedly");
                return ExitCode::FAILURE;
            }
        }
    }

    match last_verdict {
        Some(BatchVerdict::AllSucceeded) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

fn dispatch(
    state: AppState,
    msg: Msg,
    runner: &EffectRunner,
    renderer: &mut Renderer,
    last_verdict: &mut Option<BatchVerdict>,
) -> AppState {
    let (mut state, effects) = update(state, msg);
    let view = state.view();
    if state.consume_dirty() {
        if let Some(verdict) = view.verdict {
            *last_verdict = Some(verdict);
        }
        renderer.draw(&view);
    }
    runner.enqueue(effects);
    state
}

fn run_check(settings: ConvertSettings, output_dir: PathBuf) -> ExitCode {
    let (client, events) = ClientHandle::new(settings, output_dir);
    client.probe();
    match events.recv_timeout(Duration::from_secs(5)) {
        Ok(ClientEvent::ServerStatus(status)) => {
            println!("{}", status.detail);
            if status.available {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        _ => {
            eprintln!("status probe produced no answer");
            ExitCode::FAILURE
        }
    }
}

fn list_formats(files: &[PathBuf]) -> ExitCode {
    if files.is_empty() {
        for target in ConversionTarget::ALL {
            println!("{target}");
        }
        return ExitCode::SUCCESS;
    }
    for path in files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        match file_extension(name) {
            Some(ext) => {
                let recommended = recommended_target(&ext);
                let formats = compatible_targets(&ext)
                    .iter()
                    .map(|t| {
                        if Some(*t) == recommended {
                            format!("{t} (recommended)")
                        } else {
                            t.to_string()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("{name}: {formats}");
            }
            None => println!("{name}: no extension"),
        }
    }
    ExitCode::SUCCESS
}

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::Local;
use client_logging::{client_info, client_warn};
use porter_client::{ClientEvent, ClientHandle, ConvertSettings, ExportFormat};
use porter_core::{ConversionTarget, Effect, FileResultKind, Msg, Stage};

pub(crate) struct EffectRunner {
    client: ClientHandle,
    msg_tx: mpsc::Sender<Msg>,
    settle_delay: Duration,
    file_index: HashMap<String, PathBuf>,
}

impl EffectRunner {
    pub(crate) fn new(
        msg_tx: mpsc::Sender<Msg>,
        settings: ConvertSettings,
        output_dir: PathBuf,
        settle_delay: Duration,
        file_index: HashMap<String, PathBuf>,
    ) -> Self {
        let (client, event_rx) = ClientHandle::new(settings, output_dir);
        spawn_event_loop(event_rx, msg_tx.clone());
        Self {
            client,
            msg_tx,
            settle_delay,
            file_index,
        }
    }

    pub(crate) fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ProbeServer => {
                    client_info!("ProbeServer");
                    self.client.probe();
                }
                Effect::ConvertFile {
                    job_id,
                    file_name,
                    target,
                } => {
                    client_info!(
                        "ConvertFile job_id={} file={} target={}",
                        job_id,
                        file_name,
                        target
                    );
                    match self.file_index.get(&file_name) {
                        Some(path) => self.client.convert(
                            job_id,
                            path.clone(),
                            file_name,
                            map_target(target),
                        ),
                        None => {
                            client_warn!("No path recorded for selected file {}", file_name);
                            let _ = self.msg_tx.send(Msg::FileFinished {
                                job_id,
                                result: FileResultKind::Failed,
                                error_message: Some("file missing from selection".to_string()),
                                completed_at: timestamp(),
                            });
                        }
                    }
                }
                Effect::ScheduleSettle => {
                    let tx = self.msg_tx.clone();
                    let delay = self.settle_delay;
                    thread::spawn(move || {
                        thread::sleep(delay);
                        let _ = tx.send(Msg::SettleElapsed);
                    });
                }
            }
        }
    }
}

fn spawn_event_loop(event_rx: mpsc::Receiver<ClientEvent>, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        while let Ok(event) = event_rx.recv() {
            let msg = match event {
                ClientEvent::ServerStatus(status) => Msg::ServerProbed {
                    available: status.available,
                    detail: status.detail,
                },
                ClientEvent::Progress(progress) => Msg::FileProgress {
                    job_id: progress.job_id,
                    stage: map_stage(progress.stage),
                },
                ClientEvent::JobCompleted { job_id, result } => match result {
                    Ok(saved) => {
                        client_info!("Job {} wrote {}", job_id, saved.path.display());
                        Msg::FileFinished {
                            job_id,
                            result: FileResultKind::Success,
                            error_message: None,
                            completed_at: timestamp(),
                        }
                    }
                    Err(err) => {
                        client_warn!("Job {} failed: {} ({})", job_id, err.message, err.kind);
                        Msg::FileFinished {
                            job_id,
                            result: FileResultKind::Failed,
                            error_message: Some(err.message),
                            completed_at: timestamp(),
                        }
                    }
                },
            };
            if msg_tx.send(msg).is_err() {
                break;
            }
        }
    });
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn map_stage(stage: porter_client::Stage) -> Stage {
    match stage {
        porter_client::Stage::Queued => Stage::Queued,
        porter_client::Stage::Uploading => Stage::Uploading,
        porter_client::Stage::Downloading => Stage::Downloading,
        porter_client::Stage::Writing => Stage::Writing,
        porter_client::Stage::Done => Stage::Done,
    }
}

fn map_target(target: ConversionTarget) -> ExportFormat {
    match target {
        ConversionTarget::Markdown => ExportFormat::Markdown,
        ConversionTarget::Text => ExportFormat::Text,
        ConversionTarget::Pdf => ExportFormat::Pdf,
        ConversionTarget::Docx => ExportFormat::Docx,
        ConversionTarget::Xlsx => ExportFormat::Xlsx,
    }
}

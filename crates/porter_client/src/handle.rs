use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;

use client_logging::client_info;

use crate::filename::{disambiguated_name, sanitize_file_name};
use crate::persist::AtomicFileWriter;
use crate::service::{
    ChannelProgressSink, ConvertService, ConvertSettings, ProgressSink, ReqwestConvertService,
};
use crate::{
    ClientEvent, ConvertError, ExportFormat, FailureKind, JobId, JobProgress, SavedFile, Stage,
};

enum ClientCommand {
    Probe,
    Convert {
        job_id: JobId,
        path: PathBuf,
        file_name: String,
        format: ExportFormat,
    },
}

/// Handle to the client worker thread. Commands run strictly one at a time,
/// so completion events always arrive in submission order.
#[derive(Clone)]
pub struct ClientHandle {
    cmd_tx: mpsc::Sender<ClientCommand>,
}

impl ClientHandle {
    pub fn new(
        settings: ConvertSettings,
        output_dir: PathBuf,
    ) -> (Self, mpsc::Receiver<ClientEvent>) {
        Self::with_service(Arc::new(ReqwestConvertService::new(settings)), output_dir)
    }

    /// Constructs a handle over any service implementation. There is no
    /// process-wide client; callers own the handle they build.
    pub fn with_service(
        service: Arc<dyn ConvertService>,
        output_dir: PathBuf,
    ) -> (Self, mpsc::Receiver<ClientEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                // block_on keeps the ordering guarantee: the next command
                // does not start until this one resolved.
                runtime.block_on(handle_command(
                    service.as_ref(),
                    &output_dir,
                    command,
                    &event_tx,
                ));
            }
        });

        (Self { cmd_tx }, event_rx)
    }

    pub fn probe(&self) {
        let _ = self.cmd_tx.send(ClientCommand::Probe);
    }

    pub fn convert(
        &self,
        job_id: JobId,
        path: PathBuf,
        file_name: impl Into<String>,
        format: ExportFormat,
    ) {
        let _ = self.cmd_tx.send(ClientCommand::Convert {
            job_id,
            path,
            file_name: file_name.into(),
            format,
        });
    }
}

async fn handle_command(
    service: &dyn ConvertService,
    output_dir: &Path,
    command: ClientCommand,
    event_tx: &mpsc::Sender<ClientEvent>,
) {
    match command {
        ClientCommand::Probe => {
            let status = service.check_status().await;
            let _ = event_tx.send(ClientEvent::ServerStatus(status));
        }
        ClientCommand::Convert {
            job_id,
            path,
            file_name,
            format,
        } => {
            let sink = ChannelProgressSink::new(event_tx.clone());
            let result =
                convert_and_save(service, output_dir, job_id, &path, &file_name, format, &sink)
                    .await;
            let _ = event_tx.send(ClientEvent::JobCompleted { job_id, result });
        }
    }
}

async fn convert_and_save(
    service: &dyn ConvertService,
    output_dir: &Path,
    job_id: JobId,
    path: &Path,
    file_name: &str,
    format: ExportFormat,
    sink: &ChannelProgressSink,
) -> Result<SavedFile, ConvertError> {
    let bytes = std::fs::read(path).map_err(|err| {
        ConvertError::new(
            FailureKind::Validation,
            format!("{file_name}: cannot read file: {err}"),
        )
    })?;

    let converted = service.convert(job_id, file_name, bytes, format, sink).await?;

    sink.emit(ClientEvent::Progress(JobProgress {
        job_id,
        stage: Stage::Writing,
        bytes: Some(converted.bytes.len() as u64),
    }));

    let writer = AtomicFileWriter::new(output_dir.to_path_buf());
    let safe_name = sanitize_file_name(&converted.output_name);
    let final_name = if writer.exists(&safe_name) {
        disambiguated_name(&safe_name, file_name)
    } else {
        safe_name
    };
    let saved_path = writer
        .write_bytes(&final_name, &converted.bytes)
        .map_err(|err| ConvertError::new(FailureKind::Persist, err.to_string()))?;

    client_info!(
        "job {} saved {} ({} bytes)",
        job_id,
        saved_path.display(),
        converted.bytes.len()
    );

    Ok(SavedFile {
        output_name: final_name,
        path: saved_path,
        bytes_written: converted.bytes.len() as u64,
    })
}

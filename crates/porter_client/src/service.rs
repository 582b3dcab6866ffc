use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use url::Url;

use crate::filename::derive_output_name;
use crate::{
    ClientEvent, ConvertError, Converted, ExportFormat, FailureKind, JobId, JobProgress,
    ServerStatus, Stage,
};

#[derive(Debug, Clone)]
pub struct ConvertSettings {
    pub base_url: String,
    pub max_file_bytes: u64,
    pub accepted_extensions: Vec<String>,
    /// Applied to the status probe only. Conversions carry no client-side
    /// timeout; the server owns the conversion deadline.
    pub probe_timeout: Duration,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            max_file_bytes: 16 * 1024 * 1024,
            accepted_extensions: ["pdf", "docx", "doc", "txt", "md", "html", "xlsx", "xls"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            probe_timeout: Duration::from_secs(2),
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ClientEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<ClientEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<ClientEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: ClientEvent) {
        let _ = self.tx.send(event);
    }
}

#[async_trait::async_trait]
pub trait ConvertService: Send + Sync {
    /// Probes the conversion server. Every failure is absorbed into an
    /// unavailable status; this call never interrupts startup.
    async fn check_status(&self) -> ServerStatus;

    /// Performs exactly one conversion round trip.
    async fn convert(
        &self,
        job_id: JobId,
        file_name: &str,
        bytes: Vec<u8>,
        format: ExportFormat,
        sink: &dyn ProgressSink,
    ) -> Result<Converted, ConvertError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestConvertService {
    settings: ConvertSettings,
}

#[derive(Debug, Deserialize)]
struct ProbeBody {
    status: bool,
    #[serde(default)]
    docling_available: bool,
}

impl ReqwestConvertService {
    pub fn new(settings: ConvertSettings) -> Self {
        Self { settings }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ConvertError> {
        let invalid = |err: url::ParseError| {
            ConvertError::new(FailureKind::Validation, format!("invalid server url: {err}"))
        };
        Url::parse(&self.settings.base_url)
            .map_err(invalid)?
            .join(path)
            .map_err(invalid)
    }

    fn build_probe_client(&self) -> Result<reqwest::Client, ConvertError> {
        reqwest::Client::builder()
            .timeout(self.settings.probe_timeout)
            .build()
            .map_err(|err| ConvertError::new(FailureKind::Transport, err.to_string()))
    }

    fn build_convert_client(&self) -> Result<reqwest::Client, ConvertError> {
        reqwest::Client::builder()
            .build()
            .map_err(|err| ConvertError::new(FailureKind::Transport, err.to_string()))
    }

    fn validate(&self, file_name: &str, bytes: &[u8]) -> Result<(), ConvertError> {
        if bytes.is_empty() {
            return Err(ConvertError::new(
                FailureKind::Validation,
                format!("{file_name}: file is empty"),
            ));
        }
        if bytes.len() as u64 > self.settings.max_file_bytes {
            return Err(ConvertError::new(
                FailureKind::Validation,
                format!(
                    "{file_name}: exceeds the {} MiB upload limit",
                    self.settings.max_file_bytes / (1024 * 1024)
                ),
            ));
        }
        match file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
        {
            Some(ext)
                if self
                    .settings
                    .accepted_extensions
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(&ext)) =>
            {
                Ok(())
            }
            Some(ext) => Err(ConvertError::new(
                FailureKind::Validation,
                format!("{file_name}: unsupported input format .{ext}"),
            )),
            None => Err(ConvertError::new(
                FailureKind::Validation,
                format!("{file_name}: missing file extension"),
            )),
        }
    }

    async fn probe(&self) -> Result<ServerStatus, ConvertError> {
        let url = self.endpoint("/check_server")?;
        let client = self.build_probe_client()?;
        let response = client.get(url).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ConvertError::new(
                FailureKind::Server {
                    status: Some(status.as_u16()),
                },
                format!("status probe failed with http {}", status.as_u16()),
            ));
        }
        let body: ProbeBody = response.json().await.map_err(|err| {
            ConvertError::new(
                FailureKind::Server {
                    status: Some(status.as_u16()),
                },
                format!("status probe returned an unreadable body: {err}"),
            )
        })?;
        Ok(describe_probe(&body))
    }
}

fn describe_probe(body: &ProbeBody) -> ServerStatus {
    let detail = match (body.status, body.docling_available) {
        (true, true) => "conversion service available".to_string(),
        (true, false) => "conversion service available; document backend degraded".to_string(),
        (false, _) => "conversion service reports itself unavailable".to_string(),
    };
    ServerStatus {
        available: body.status,
        detail,
    }
}

#[async_trait::async_trait]
impl ConvertService for ReqwestConvertService {
    async fn check_status(&self) -> ServerStatus {
        match self.probe().await {
            Ok(status) => status,
            Err(err) => ServerStatus {
                available: false,
                detail: err.message,
            },
        }
    }

    async fn convert(
        &self,
        job_id: JobId,
        file_name: &str,
        bytes: Vec<u8>,
        format: ExportFormat,
        sink: &dyn ProgressSink,
    ) -> Result<Converted, ConvertError> {
        self.validate(file_name, &bytes)?;

        let url = self.endpoint("/convert")?;
        let client = self.build_convert_client()?;
        let upload_len = bytes.len() as u64;

        sink.emit(ClientEvent::Progress(JobProgress {
            job_id,
            stage: Stage::Uploading,
            bytes: Some(upload_len),
        }));

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("export_format", format.form_value());
        let response = client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        // The service signals failure with a JSON body regardless of HTTP
        // status; any other content type is the converted payload.
        if content_type.as_deref().map(is_json).unwrap_or(false) {
            let text = response.text().await.map_err(map_reqwest_error)?;
            return Err(structured_failure(status.as_u16(), &text));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ConvertError::new(
                FailureKind::Server {
                    status: Some(status.as_u16()),
                },
                format!("http {}: {}", status.as_u16(), text.trim()),
            ));
        }

        sink.emit(ClientEvent::Progress(JobProgress {
            job_id,
            stage: Stage::Downloading,
            bytes: Some(0),
        }));

        let mut payload = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            payload.extend_from_slice(&chunk);
            sink.emit(ClientEvent::Progress(JobProgress {
                job_id,
                stage: Stage::Downloading,
                bytes: Some(payload.len() as u64),
            }));
        }

        Ok(Converted {
            bytes: payload,
            output_name: derive_output_name(file_name, format),
            content_type,
        })
    }
}

fn is_json(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim();
    mime.eq_ignore_ascii_case("application/json")
}

fn structured_failure(status: u16, text: &str) -> ConvertError {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => match value.get("error").and_then(|v| v.as_str()) {
            Some(message) => ConvertError::new(FailureKind::Conversion, message),
            // Anything not shaped like {error} is an opaque server failure;
            // keep the raw text.
            None => ConvertError::new(
                FailureKind::Server {
                    status: Some(status),
                },
                text.trim(),
            ),
        },
        Err(_) => ConvertError::new(
            FailureKind::Server {
                status: Some(status),
            },
            text.trim(),
        ),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ConvertError {
    if err.is_timeout() {
        return ConvertError::new(FailureKind::Transport, "request timed out");
    }
    ConvertError::new(FailureKind::Transport, err.to_string())
}

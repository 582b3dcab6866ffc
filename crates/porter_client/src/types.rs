use std::fmt;
use std::path::PathBuf;

pub type JobId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Queued,
    Uploading,
    Downloading,
    Writing,
    Done,
}

/// Wire-level output format, as carried by the `export_format` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Text,
    Pdf,
    Docx,
    Xlsx,
}

impl ExportFormat {
    /// Upper-case form sent to the service.
    pub fn form_value(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "MARKDOWN",
            ExportFormat::Text => "TEXT",
            ExportFormat::Pdf => "PDF",
            ExportFormat::Docx => "DOCX",
            ExportFormat::Xlsx => "XLSX",
        }
    }

    /// Extension of the converted output. Markdown downloads as `.md`;
    /// every other format uses its lowercased name.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Text => "text",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    /// Parses a case-insensitive format name.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "markdown" => Some(ExportFormat::Markdown),
            "text" => Some(ExportFormat::Text),
            "pdf" => Some(ExportFormat::Pdf),
            "docx" => Some(ExportFormat::Docx),
            "xlsx" => Some(ExportFormat::Xlsx),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobProgress {
    pub job_id: JobId,
    pub stage: Stage,
    pub bytes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStatus {
    pub available: bool,
    pub detail: String,
}

/// Converted payload as returned by the service, before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub bytes: Vec<u8>,
    pub output_name: String,
    pub content_type: Option<String>,
}

/// A converted file persisted to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub output_name: String,
    pub path: PathBuf,
    pub bytes_written: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Progress(JobProgress),
    ServerStatus(ServerStatus),
    JobCompleted {
        job_id: JobId,
        result: Result<SavedFile, ConvertError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertError {
    pub kind: FailureKind,
    pub message: String,
}

impl ConvertError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Rejected before any network traffic.
    Validation,
    /// Network unreachable or the connection died mid-request.
    Transport,
    /// Non-success response without a structured failure reason.
    Server { status: Option<u16> },
    /// The service reported a structured conversion failure.
    Conversion,
    /// The converted payload could not be written locally.
    Persist,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Validation => write!(f, "validation error"),
            FailureKind::Transport => write!(f, "network error"),
            FailureKind::Server {
                status: Some(status),
            } => write!(f, "server error (http {status})"),
            FailureKind::Server { status: None } => write!(f, "server error"),
            FailureKind::Conversion => write!(f, "conversion failed"),
            FailureKind::Persist => write!(f, "could not save output"),
        }
    }
}

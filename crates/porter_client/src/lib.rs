//! Porter client: conversion service IO, download persistence and the
//! sequential batch worker.
mod filename;
mod handle;
mod persist;
mod service;
mod types;

pub use filename::{derive_output_name, disambiguated_name, sanitize_file_name};
pub use handle::ClientHandle;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use service::{
    ChannelProgressSink, ConvertService, ConvertSettings, ProgressSink, ReqwestConvertService,
};
pub use types::{
    ClientEvent, ConvertError, Converted, ExportFormat, FailureKind, JobId, JobProgress, SavedFile,
    ServerStatus, Stage,
};

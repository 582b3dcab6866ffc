#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Probe the conversion server's status endpoint.
    ProbeServer,
    /// Convert one file. Emitted in input order when a batch starts; the
    /// platform layer maps the name back to the actual bytes.
    ConvertFile {
        job_id: crate::JobId,
        file_name: String,
        target: crate::ConversionTarget,
    },
    /// Arrange for `Msg::SettleElapsed` after the configured delay.
    ScheduleSettle,
}

use log::{error, info, warn};
use serde_json::Value;

/// Severity of a recorded step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Observational sink for per-request diagnostic steps.
///
/// Purely side-channel: implementations must never influence the data a
/// search returns, and every call site works with [`NoopSink`]. The `emit`
/// flag marks steps that should also surface in the process log.
pub trait EventSink: Send + Sync {
    fn record(&self, label: &str, metadata: Value, emit: bool, severity: Severity);
}

/// Sink that discards every step
pub struct NoopSink;

impl EventSink for NoopSink {
    fn record(&self, _label: &str, _metadata: Value, _emit: bool, _severity: Severity) {}
}

/// Sink that forwards emitted steps to the process log
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&self, label: &str, metadata: Value, emit: bool, severity: Severity) {
        if !emit {
            return;
        }
        match severity {
            Severity::Info => info!("{label} {metadata}"),
            Severity::Warning => warn!("{label} {metadata}"),
            Severity::Error => error!("{label} {metadata}"),
        }
    }
}

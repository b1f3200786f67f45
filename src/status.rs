/// Status objects reported back to Jobster.
///
/// Success goes to stdout, handled failures to stderr. Each is a single
/// compact JSON line so the executor can pick it out of the stream.
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Ok,
    Error,
}

/// The `metrics` block of a success report.
#[derive(Debug, Clone, Serialize)]
pub struct LoggedMetrics {
    pub logged: u32,
    pub file: String,
}

/// Written to stdout after a record has been appended.
#[derive(Debug, Clone, Serialize)]
pub struct SuccessReport {
    pub status: AgentStatus,
    pub metrics: LoggedMetrics,
    pub notes: String,
}

impl SuccessReport {
    /// Report a single record appended to `file`.
    pub fn appended(file: &Path) -> Self {
        let file = file.display().to_string();
        Self {
            status: AgentStatus::Ok,
            notes: format!("Metrics appended to {file}"),
            metrics: LoggedMetrics { logged: 1, file },
        }
    }
}

/// Written to stderr when the agent fails in a way Jobster should see.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub status: AgentStatus,
    pub error: String,
}

impl ErrorReport {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: AgentStatus::Error,
            error: error.into(),
        }
    }
}

/// Serialize `report` as one JSON line into `out`.
pub fn emit<T: Serialize>(out: &mut impl Write, report: &T) -> std::io::Result<()> {
    serde_json::to_writer(&mut *out, report)?;
    out.write_all(b"\n")?;
    out.flush()
}

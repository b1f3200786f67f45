use crate::error::AgentError;
use std::path::PathBuf;

/// File name of the metrics log inside the state directory.
pub const METRICS_FILE: &str = "metrics.jsonl";

/// The per-job writable directory Jobster hands to agents via `STATE_DIR`.
///
/// Paths are used exactly as given; a relative `STATE_DIR` resolves against
/// the agent's working directory.
#[derive(Debug, Clone)]
pub struct StateDir {
    root: PathBuf,
}

impl StateDir {
    /// Create a new StateDir referencing the given root path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path to the metrics log (e.g. `<state>/metrics.jsonl`).
    pub fn metrics_log(&self) -> PathBuf {
        self.root.join(METRICS_FILE)
    }

    /// Create the directory and any missing parents.
    /// Returns Ok(true) if it was created, Ok(false) if it already existed.
    pub fn ensure(&self) -> Result<bool, AgentError> {
        let created = !self.root.exists();
        std::fs::create_dir_all(&self.root).map_err(|e| AgentError::CreateStateDir {
            path: self.root.clone(),
            source: e,
        })?;
        if created {
            tracing::debug!(path = %self.root.display(), "created state directory");
        }
        Ok(created)
    }
}

/// The hook agent pipeline: parse config, validate the state directory,
/// build one metrics record and append it to the log.
use crate::config::HookConfig;
use crate::error::AgentError;
use crate::job_env::JobEnv;
use crate::metrics_log::MetricsLog;
use crate::record::MetricsRecord;
use crate::state_dir::StateDir;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Result of a successful invocation.
#[derive(Debug)]
pub struct Outcome {
    /// Path of the metrics log the record was appended to.
    pub file: PathBuf,
    pub record: MetricsRecord,
}

/// Run the agent once against the captured environment.
///
/// Steps run strictly in order; the first failure ends the run and nothing
/// is appended.
pub fn run(env: &JobEnv, now: DateTime<Utc>) -> Result<Outcome, AgentError> {
    let config = HookConfig::parse(env.config_json.as_deref())?;

    let state_dir = env
        .state_dir()
        .map(StateDir::new)
        .ok_or(AgentError::MissingStateDir)?;
    state_dir.ensure()?;

    if env.hook.is_some() && !env.is_known_hook() {
        tracing::debug!(hook = ?env.hook, "unrecognized hook name, recording as-is");
    }

    let record = MetricsRecord::build(env, &config, now)?;

    let log = MetricsLog::new(state_dir.metrics_log());
    log.append(&record)?;

    tracing::info!(
        job_id = %record.job_id,
        run_id = %record.run_id,
        hook = %record.hook,
        duration_sec = ?record.duration_sec,
        file = %log.path().display(),
        "metrics logged"
    );

    Ok(Outcome {
        file: log.path().to_path_buf(),
        record,
    })
}

mod agent;
mod config;
mod error;
mod job_env;
mod metrics_log;
mod record;
mod state_dir;
mod status;

use clap::Parser;
use error::AgentError;
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the diagnostic log filter.
const LOG_ENV: &str = "LOG_METRICS_LOG";

const EXIT_OK: u8 = 0;
const EXIT_FAILURE: u8 = 1;

/// Jobster hook agent: appends one metrics record per invocation to
/// `$STATE_DIR/metrics.jsonl` and reports a JSON status line.
///
/// All job inputs come from the environment (CONFIG_JSON, STATE_DIR,
/// JOB_ID, RUN_ID, HOOK, JOB_COMMAND, JOB_SCHEDULE, START_TS, END_TS,
/// EXIT_CODE, ATTEMPT).
#[derive(Parser, Debug)]
#[command(name = "log-metrics", version, about)]
pub struct Cli {
    /// Debug diagnostics on stderr (overrides LOG_METRICS_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    // Off by default: stderr is reserved for the JSON error object.
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!(?cli, "parsed CLI arguments");

    let env = job_env::JobEnv::from_process();
    let result = agent::run(&env, chrono::Utc::now());

    let code = report(
        result,
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    );
    ExitCode::from(code)
}

/// Write the status line for `result` and pick the process exit code.
///
/// The exit code follows the metrics log: once a record is appended the run
/// succeeded, even if the status line can't be written afterwards.
fn report(
    result: Result<agent::Outcome, AgentError>,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> u8 {
    match result {
        Ok(outcome) => {
            tracing::debug!(record = ?outcome.record, "record written");
            let line = status::SuccessReport::appended(&outcome.file);
            if let Err(e) = status::emit(stdout, &line) {
                tracing::warn!(
                    error = %e,
                    file = %outcome.file.display(),
                    "record appended but status not written"
                );
                let _ = writeln!(
                    stderr,
                    "log-metrics: record appended but failed to write status: {e}"
                );
            }
            EXIT_OK
        }
        Err(err) if err.is_handled() => {
            tracing::warn!(error = %err, path = ?err.path(), "metrics not logged");
            let line = status::ErrorReport::new(err.to_string());
            let _ = status::emit(stderr, &line);
            EXIT_FAILURE
        }
        Err(err) => {
            let _ = writeln!(stderr, "log-metrics: {err}");
            EXIT_FAILURE
        }
    }
}

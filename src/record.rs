/// Metrics record: one JSON object per agent invocation, built from the
/// job metadata Jobster exports and the hook's custom metrics.
use crate::config::HookConfig;
use crate::error::AgentError;
use crate::job_env::{self, JobEnv};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::Serialize;
use serde_json::Value;

const UNKNOWN: &str = "unknown";
const DEFAULT_EXIT_CODE: i64 = -1;
const DEFAULT_ATTEMPT: i64 = 1;

/// A single line of `metrics.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRecord {
    pub timestamp: String,
    pub job_id: String,
    pub run_id: String,
    pub hook: String,
    pub job_command: String,
    pub job_schedule: String,
    pub start_ts: String,
    pub end_ts: String,
    pub exit_code: i64,
    pub attempt: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<f64>,
}

impl MetricsRecord {
    /// Build the record for this invocation, captured at `now`.
    ///
    /// Fails if `EXIT_CODE` or `ATTEMPT` is set to something that is not an
    /// integer, if the hook config is not a JSON object, or if the start and
    /// end timestamps disagree on carrying an offset. Unparseable timestamps
    /// just leave `duration_sec` off.
    pub fn build(
        env: &JobEnv,
        config: &HookConfig,
        now: DateTime<Utc>,
    ) -> Result<Self, AgentError> {
        let start_ts = env.start_ts.clone().unwrap_or_default();
        let end_ts = env.end_ts.clone().unwrap_or_default();

        let exit_code = parse_int(job_env::EXIT_CODE, env.exit_code.as_deref(), DEFAULT_EXIT_CODE)?;
        let attempt = parse_int(job_env::ATTEMPT, env.attempt.as_deref(), DEFAULT_ATTEMPT)?;

        let custom = config.custom_metrics()?.cloned();

        let duration_sec = if !start_ts.is_empty() && !end_ts.is_empty() {
            duration_between(&start_ts, &end_ts)?
        } else {
            None
        };

        Ok(Self {
            timestamp: format_timestamp(now),
            job_id: or_unknown(&env.job_id),
            run_id: or_unknown(&env.run_id),
            hook: or_unknown(&env.hook),
            job_command: env.job_command.clone().unwrap_or_default(),
            job_schedule: env.job_schedule.clone().unwrap_or_default(),
            start_ts,
            end_ts,
            exit_code,
            attempt,
            custom,
            duration_sec,
        })
    }
}

fn or_unknown(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| UNKNOWN.to_string())
}

fn parse_int(var: &'static str, value: Option<&str>, default: i64) -> Result<i64, AgentError> {
    let Some(value) = value else {
        return Ok(default);
    };
    value
        .trim()
        .parse()
        .map_err(|e| AgentError::MalformedInteger {
            var,
            value: value.to_string(),
            source: e,
        })
}

/// ISO-8601 UTC with a `Z` suffix. Microseconds are written only when
/// non-zero: `2024-01-01T00:00:10Z`, `2024-01-01T00:00:10.250000Z`.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    if now.nanosecond() / 1_000 == 0 {
        now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    } else {
        now.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
    }
}

/// A parsed ISO-8601 instant. Values without an offset stay naive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instant {
    Offset(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

const OFFSET_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
];

const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse an ISO-8601 timestamp, reading `Z` as `+00:00`.
pub fn parse_instant(raw: &str) -> Option<Instant> {
    let s = raw.trim().replace('Z', "+00:00");

    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Some(Instant::Offset(dt));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&s, fmt) {
            return Some(Instant::Offset(dt));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&s, fmt) {
            return Some(Instant::Naive(dt));
        }
    }
    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(Instant::Naive)
}

/// Seconds from `start` to `end`, negative if `end` comes first.
///
/// `Ok(None)` when either side fails to parse. An error when both parse but
/// only one carries an offset, since there is no way to subtract them.
pub fn duration_between(start: &str, end: &str) -> Result<Option<f64>, AgentError> {
    let (Some(s), Some(e)) = (parse_instant(start), parse_instant(end)) else {
        tracing::debug!(start, end, "unparseable timestamp, skipping duration");
        return Ok(None);
    };
    let delta = match (s, e) {
        (Instant::Offset(s), Instant::Offset(e)) => e - s,
        (Instant::Naive(s), Instant::Naive(e)) => e - s,
        _ => {
            return Err(AgentError::IncomparableTimestamps {
                start: start.to_string(),
                end: end.to_string(),
            })
        }
    };
    Ok(delta
        .num_microseconds()
        .map(|us| us as f64 / 1_000_000.0))
}

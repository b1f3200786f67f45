/// Environment-variable inputs supplied by Jobster when it runs a hook agent.
///
/// Captured once at startup. A variable that is set to the empty string is
/// kept as `Some("")`; only unset variables are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobEnv {
    pub config_json: Option<String>,
    pub state_dir: Option<String>,
    pub job_id: Option<String>,
    pub run_id: Option<String>,
    pub hook: Option<String>,
    pub job_command: Option<String>,
    pub job_schedule: Option<String>,
    pub start_ts: Option<String>,
    pub end_ts: Option<String>,
    pub exit_code: Option<String>,
    pub attempt: Option<String>,
}

pub const CONFIG_JSON: &str = "CONFIG_JSON";
pub const STATE_DIR: &str = "STATE_DIR";
pub const JOB_ID: &str = "JOB_ID";
pub const RUN_ID: &str = "RUN_ID";
pub const HOOK: &str = "HOOK";
pub const JOB_COMMAND: &str = "JOB_COMMAND";
pub const JOB_SCHEDULE: &str = "JOB_SCHEDULE";
pub const START_TS: &str = "START_TS";
pub const END_TS: &str = "END_TS";
pub const EXIT_CODE: &str = "EXIT_CODE";
pub const ATTEMPT: &str = "ATTEMPT";

/// Lifecycle hook names Jobster invokes agents for.
pub const KNOWN_HOOKS: [&str; 4] = ["pre_run", "post_run", "on_success", "on_error"];

impl JobEnv {
    /// Read the agent inputs from the process environment.
    pub fn from_process() -> Self {
        Self::from_lookup(|key| {
            std::env::var_os(key).map(|v| v.to_string_lossy().into_owned())
        })
    }

    /// Read the agent inputs through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            config_json: lookup(CONFIG_JSON),
            state_dir: lookup(STATE_DIR),
            job_id: lookup(JOB_ID),
            run_id: lookup(RUN_ID),
            hook: lookup(HOOK),
            job_command: lookup(JOB_COMMAND),
            job_schedule: lookup(JOB_SCHEDULE),
            start_ts: lookup(START_TS),
            end_ts: lookup(END_TS),
            exit_code: lookup(EXIT_CODE),
            attempt: lookup(ATTEMPT),
        }
    }

    /// `STATE_DIR`, if set to a non-empty value.
    pub fn state_dir(&self) -> Option<&str> {
        self.state_dir.as_deref().filter(|s| !s.is_empty())
    }

    /// Whether `HOOK` names one of Jobster's lifecycle hooks.
    pub fn is_known_hook(&self) -> bool {
        self.hook
            .as_deref()
            .is_some_and(|h| KNOWN_HOOKS.contains(&h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_reads_every_var() {
        let env = JobEnv::from_lookup(lookup_from(&[
            (CONFIG_JSON, "{}"),
            (STATE_DIR, "/tmp/state"),
            (JOB_ID, "backup"),
            (RUN_ID, "r-1"),
            (HOOK, "post_run"),
            (JOB_COMMAND, "tar czf out.tgz ."),
            (JOB_SCHEDULE, "0 * * * *"),
            (START_TS, "2024-01-01T00:00:00Z"),
            (END_TS, "2024-01-01T00:00:10Z"),
            (EXIT_CODE, "0"),
            (ATTEMPT, "2"),
        ]));

        assert_eq!(env.state_dir(), Some("/tmp/state"));
        assert_eq!(env.job_id.as_deref(), Some("backup"));
        assert_eq!(env.job_schedule.as_deref(), Some("0 * * * *"));
        assert_eq!(env.attempt.as_deref(), Some("2"));
        assert!(env.is_known_hook());
    }

    #[test]
    fn test_unset_vars_are_none() {
        let env = JobEnv::from_lookup(|_| None);
        assert_eq!(env, JobEnv::default());
        assert_eq!(env.state_dir(), None);
        assert!(!env.is_known_hook());
    }

    #[test]
    fn test_empty_state_dir_counts_as_missing() {
        let env = JobEnv::from_lookup(lookup_from(&[(STATE_DIR, "")]));
        assert_eq!(env.state_dir.as_deref(), Some(""));
        assert_eq!(env.state_dir(), None);
    }

    #[test]
    fn test_unknown_hook_name() {
        let env = JobEnv::from_lookup(lookup_from(&[(HOOK, "after_lunch")]));
        assert!(!env.is_known_hook());
    }
}

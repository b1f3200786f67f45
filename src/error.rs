use std::path::{Path, PathBuf};

/// Errors that can end an agent invocation.
///
/// Only some of these are part of the agent contract with Jobster. The
/// handled ones are reported as a JSON error object on stderr; the rest
/// surface as a plain diagnostic line.
#[derive(Debug)]
pub enum AgentError {
    /// `CONFIG_JSON` is not valid JSON.
    ConfigParse { source: serde_json::Error },
    /// `CONFIG_JSON` is valid JSON but not an object, so `metrics` can't be read.
    ConfigNotObject { kind: &'static str },
    /// `STATE_DIR` is unset or empty.
    MissingStateDir,
    /// The state directory could not be created.
    CreateStateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// `EXIT_CODE` or `ATTEMPT` is present but not an integer.
    MalformedInteger {
        var: &'static str,
        value: String,
        source: std::num::ParseIntError,
    },
    /// One timestamp carries a UTC offset and the other doesn't.
    IncomparableTimestamps { start: String, end: String },
    /// Opening or writing the metrics log failed.
    MetricsWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl AgentError {
    /// Whether this error is reported through the structured status channel.
    pub fn is_handled(&self) -> bool {
        matches!(
            self,
            AgentError::ConfigParse { .. }
                | AgentError::MissingStateDir
                | AgentError::MetricsWrite { .. }
        )
    }

    /// The filesystem path involved, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            AgentError::CreateStateDir { path, .. } | AgentError::MetricsWrite { path, .. } => {
                Some(path.as_path())
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for AgentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentError::ConfigParse { source } => write!(f, "Invalid CONFIG_JSON: {source}"),
            AgentError::ConfigNotObject { kind } => {
                write!(f, "CONFIG_JSON is a JSON {kind}, expected an object")
            }
            AgentError::MissingStateDir => write!(f, "STATE_DIR environment variable not set"),
            AgentError::CreateStateDir { path, source } => {
                write!(
                    f,
                    "failed to create state directory {}: {source}",
                    path.display()
                )
            }
            AgentError::MalformedInteger { var, value, source } => {
                write!(f, "invalid integer for {var} ({value:?}): {source}")
            }
            AgentError::IncomparableTimestamps { start, end } => {
                write!(
                    f,
                    "cannot subtract START_TS {start:?} and END_TS {end:?}: one has a UTC offset and the other does not"
                )
            }
            AgentError::MetricsWrite { source, .. } => {
                write!(f, "Failed to write metrics: {source}")
            }
        }
    }
}

impl std::error::Error for AgentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AgentError::ConfigParse { source } => Some(source),
            AgentError::MissingStateDir
            | AgentError::ConfigNotObject { .. }
            | AgentError::IncomparableTimestamps { .. } => None,
            AgentError::CreateStateDir { source, .. } => Some(source),
            AgentError::MalformedInteger { source, .. } => Some(source),
            AgentError::MetricsWrite { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_missing_state_dir_message() {
        let err = AgentError::MissingStateDir;
        assert_eq!(err.to_string(), "STATE_DIR environment variable not set");
        assert!(err.is_handled());
        assert!(err.source().is_none());
    }

    #[test]
    fn test_config_parse_message_has_prefix() {
        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = AgentError::ConfigParse { source };
        assert!(err.to_string().starts_with("Invalid CONFIG_JSON: "));
        assert!(err.is_handled());
        assert!(err.source().is_some());
    }

    #[test]
    fn test_metrics_write_message_omits_path() {
        let err = AgentError::MetricsWrite {
            path: PathBuf::from("/tmp/state/metrics.jsonl"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no perms"),
        };
        assert_eq!(err.to_string(), "Failed to write metrics: no perms");
        assert!(err.is_handled());
        assert_eq!(err.path(), Some(Path::new("/tmp/state/metrics.jsonl")));
    }

    #[test]
    fn test_unhandled_variants() {
        let source = "abc".parse::<i64>().unwrap_err();
        let err = AgentError::MalformedInteger {
            var: "EXIT_CODE",
            value: "abc".to_string(),
            source,
        };
        assert!(!err.is_handled());
        assert!(err.to_string().contains("EXIT_CODE"));
        assert!(err.to_string().contains("\"abc\""));

        let err = AgentError::CreateStateDir {
            path: PathBuf::from("/proc/nope"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(!err.is_handled());
        assert!(err.to_string().contains("/proc/nope"));

        let err = AgentError::ConfigNotObject { kind: "array" };
        assert!(!err.is_handled());
        assert_eq!(err.to_string(), "CONFIG_JSON is a JSON array, expected an object");

        let err = AgentError::IncomparableTimestamps {
            start: "2024-01-01T00:00:00".to_string(),
            end: "2024-01-01T00:00:10Z".to_string(),
        };
        assert!(!err.is_handled());
        assert!(err.to_string().contains("START_TS \"2024-01-01T00:00:00\""));
    }
}

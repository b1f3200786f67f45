/// Append-only JSON Lines log of metrics records.
///
/// No locking: each record goes out as a single write on an `O_APPEND`
/// handle, so concurrent agents rely on the OS keeping small appends whole.
use crate::error::AgentError;
use crate::record::MetricsRecord;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct MetricsLog {
    path: PathBuf,
}

impl MetricsLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a newline-terminated JSON line, creating the file if needed.
    pub fn append(&self, record: &MetricsRecord) -> Result<(), AgentError> {
        let write_err = |source: std::io::Error| AgentError::MetricsWrite {
            path: self.path.clone(),
            source,
        };

        let mut line = serde_json::to_vec(record).map_err(|e| write_err(e.into()))?;
        line.push(b'\n');

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(write_err)?;
        file.write_all(&line).map_err(write_err)?;

        tracing::debug!(
            path = %self.path.display(),
            bytes = line.len(),
            "appended metrics record"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HookConfig;
    use crate::job_env::JobEnv;
    use chrono::Utc;
    use tempfile::tempdir;

    fn record_for(job_id: &str) -> MetricsRecord {
        let env = JobEnv {
            job_id: Some(job_id.to_string()),
            ..Default::default()
        };
        MetricsRecord::build(&env, &HookConfig::default(), Utc::now()).unwrap()
    }

    #[test]
    fn test_append_creates_file_with_one_line() {
        let dir = tempdir().unwrap();
        let log = MetricsLog::new(dir.path().join("metrics.jsonl"));

        log.append(&record_for("backup")).unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        assert!(contents.ends_with('\n'));
        assert_eq!(contents.lines().count(), 1);
        let parsed: serde_json::Value = serde_json::from_str(contents.trim_end()).unwrap();
        assert_eq!(parsed["job_id"], "backup");
    }

    #[test]
    fn test_append_never_rewrites_existing_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");
        std::fs::write(&path, "{\"existing\":true}\n").unwrap();
        let log = MetricsLog::new(path.clone());

        for i in 0..3 {
            log.append(&record_for(&format!("job-{i}"))).unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "{\"existing\":true}");
        for (i, line) in lines[1..].iter().enumerate() {
            let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(parsed["job_id"], format!("job-{i}"));
        }
    }

    #[test]
    fn test_append_to_missing_dir_fails() {
        let log = MetricsLog::new(PathBuf::from("/nonexistent/dir/metrics.jsonl"));
        let err = log.append(&record_for("x")).unwrap_err();
        assert!(matches!(err, AgentError::MetricsWrite { .. }));
        assert!(err.to_string().starts_with("Failed to write metrics: "));
    }

    #[test]
    fn test_append_to_directory_path_fails() {
        let dir = tempdir().unwrap();
        let log = MetricsLog::new(dir.path().to_path_buf());
        let err = log.append(&record_for("x")).unwrap_err();
        assert!(err.is_handled());
    }
}

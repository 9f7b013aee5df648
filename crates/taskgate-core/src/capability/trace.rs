//! Append-only trace of tool authorization decisions.
//!
//! The recorder is the only side effect of call-time authorization. It is kept
//! behind the narrow [`TraceRecorder`] interface so the authorization
//! predicate stays testable without I/O. File appends run on the blocking
//! pool, like artifact writes.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::transport::TransportKind;

/// File name of the per-run trace log.
pub const TRACE_FILE_NAME: &str = "tool_traces.jsonl";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStatus {
    /// Authorization denied; the transport was never reached.
    Denied,
    /// Authorized and the transport reported success.
    Ok,
    /// Authorized but the transport failed or reported `ok: false`.
    Error,
    /// Authorized but the transport did not answer in time.
    Timeout,
}

/// One immutable trace line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub ts: DateTime<Utc>,
    pub status: TraceStatus,
    pub tool: String,
    pub skill_id: String,
    pub server_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportKind>,
    /// Top-level argument keys; values are never traced.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args_shape: Vec<String>,
}

/// Write-only sink for trace entries.
#[async_trait]
pub trait TraceRecorder: Send + Sync {
    async fn record(&self, entry: &TraceEntry) -> std::io::Result<()>;
}

#[async_trait]
impl<T: TraceRecorder + ?Sized> TraceRecorder for Arc<T> {
    async fn record(&self, entry: &TraceEntry) -> std::io::Result<()> {
        (**self).record(entry).await
    }
}

/// JSON-lines trace log stored in a run's artifact directory.
///
/// Layout: `<root>/<run_id>/tool_traces.jsonl`. Runs never share a file.
#[derive(Debug)]
pub struct JsonlTraceLog {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonlTraceLog {
    pub fn for_run(root: impl AsRef<Path>, run_id: &str) -> Self {
        Self {
            path: root.as_ref().join(run_id).join(TRACE_FILE_NAME),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back every entry (used by tests and the CLI).
    pub fn read_entries(&self) -> std::io::Result<Vec<TraceEntry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(std::io::Error::from))
            .collect()
    }
}

fn append_line(lock: &Mutex<()>, path: &Path, line: &str) -> std::io::Result<()> {
    let _guard = lock
        .lock()
        .map_err(|_| std::io::Error::other("trace log lock poisoned"))?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}

#[async_trait]
impl TraceRecorder for JsonlTraceLog {
    async fn record(&self, entry: &TraceEntry) -> std::io::Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let lock = Arc::clone(&self.write_lock);
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || append_line(&lock, &path, &line))
            .await
            .map_err(std::io::Error::other)?
    }
}

/// In-memory recorder.
#[derive(Debug, Default)]
pub struct MemoryTraceLog {
    entries: Mutex<Vec<TraceEntry>>,
}

impl MemoryTraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<TraceEntry> {
        self.entries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TraceRecorder for MemoryTraceLog {
    async fn record(&self, entry: &TraceEntry) -> std::io::Result<()> {
        self.entries
            .lock()
            .map_err(|_| std::io::Error::other("trace log lock poisoned"))?
            .push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(status: TraceStatus, tool: &str) -> TraceEntry {
        TraceEntry {
            ts: Utc::now(),
            status,
            tool: tool.into(),
            skill_id: "s1".into(),
            server_id: "remote_default".into(),
            reason: None,
            transport: None,
            args_shape: vec![],
        }
    }

    #[tokio::test]
    async fn test_jsonl_log_appends_per_run() {
        let dir = tempfile::tempdir().unwrap();
        let log_a = JsonlTraceLog::for_run(dir.path(), "run-a");
        let log_b = JsonlTraceLog::for_run(dir.path(), "run-b");

        log_a.record(&entry(TraceStatus::Ok, "search")).await.unwrap();
        log_a.record(&entry(TraceStatus::Denied, "write")).await.unwrap();
        log_b.record(&entry(TraceStatus::Ok, "fetch")).await.unwrap();

        let a = log_a.read_entries().unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(a[1].status, TraceStatus::Denied);
        assert_eq!(log_b.read_entries().unwrap().len(), 1);
        assert!(log_a.path().ends_with("run-a/tool_traces.jsonl"));
    }

    #[tokio::test]
    async fn test_concurrent_appends_keep_whole_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(JsonlTraceLog::for_run(dir.path(), "run-c"));

        let mut handles = Vec::new();
        for i in 0..16 {
            let log = Arc::clone(&log);
            handles.push(tokio::spawn(async move {
                log.record(&entry(TraceStatus::Ok, &format!("tool-{i}"))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut tools: Vec<_> = log.read_entries().unwrap().into_iter().map(|e| e.tool).collect();
        tools.sort();
        let mut expected: Vec<_> = (0..16).map(|i| format!("tool-{i}")).collect();
        expected.sort();
        assert_eq!(tools, expected);
    }

    #[test]
    fn test_missing_log_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonlTraceLog::for_run(dir.path(), "never-written");
        assert!(log.read_entries().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_log_preserves_order() {
        let log = MemoryTraceLog::new();
        log.record(&entry(TraceStatus::Ok, "a")).await.unwrap();
        log.record(&entry(TraceStatus::Timeout, "b")).await.unwrap();
        let tools: Vec<_> = log.entries().into_iter().map(|e| e.tool).collect();
        assert_eq!(tools, vec!["a", "b"]);
    }

    #[test]
    fn test_entry_omits_empty_optionals() {
        let json = serde_json::to_value(entry(TraceStatus::Denied, "write")).unwrap();
        assert_eq!(json["status"], "denied");
        assert!(json.get("transport").is_none());
        assert!(json.get("args_shape").is_none());
    }
}

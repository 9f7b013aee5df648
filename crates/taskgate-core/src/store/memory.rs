use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::capability::{MemoryTraceLog, TraceEntry, TraceRecorder};

use super::{check_name, encode, ArtifactLocator, ArtifactStore, StoreError};

/// In-process store keyed by `(run_id, name)`.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    documents: Mutex<BTreeMap<(String, String), serde_json::Value>>,
    traces: Mutex<BTreeMap<String, Arc<MemoryTraceLog>>>,
}

fn poisoned() -> StoreError {
    StoreError::Io(std::io::Error::other("artifact store lock poisoned"))
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, run_id: &str, name: &str) -> Option<serde_json::Value> {
        self.documents
            .lock()
            .ok()?
            .get(&(run_id.to_string(), name.to_string()))
            .cloned()
    }

    /// Names persisted for `run_id`, sorted.
    pub fn names(&self, run_id: &str) -> Vec<String> {
        self.documents
            .lock()
            .map(|docs| {
                docs.keys()
                    .filter(|(run, _)| run == run_id)
                    .map(|(_, name)| name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn trace_entries(&self, run_id: &str) -> Vec<TraceEntry> {
        self.traces
            .lock()
            .ok()
            .and_then(|traces| traces.get(run_id).map(|log| log.entries()))
            .unwrap_or_default()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn persist(
        &self,
        run_id: &str,
        name: &str,
        document: &serde_json::Value,
    ) -> Result<ArtifactLocator, StoreError> {
        check_name(run_id)?;
        check_name(name)?;
        let bytes = encode(document)?;

        let mut docs = self.documents.lock().map_err(|_| poisoned())?;
        let key = (run_id.to_string(), name.to_string());
        if docs.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                run_id: run_id.to_string(),
                name: name.to_string(),
            });
        }
        docs.insert(key, document.clone());
        Ok(ArtifactLocator::new(run_id, name, &bytes))
    }

    fn trace_log(&self, run_id: &str) -> Arc<dyn TraceRecorder> {
        match self.traces.lock() {
            Ok(mut traces) => traces.entry(run_id.to_string()).or_default().clone(),
            Err(_) => Arc::new(MemoryTraceLog::new()),
        }
    }
}

//! Run artifact persistence.
//!
//! Append-only: a document name is written at most once per run. Every run
//! owns its own partition, so concurrent runs never share a file.
//!
//! # Modules
//!
//! - [`fs`]: `<root>/<run_id>/<name>` on disk, atomic writes
//! - [`memory`]: in-process store

pub mod fs;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::capability::TraceRecorder;

pub use fs::FsArtifactStore;
pub use memory::MemoryArtifactStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("artifact '{name}' already exists for run {run_id}")]
    AlreadyExists { run_id: String, name: String },

    #[error("invalid artifact name: {0:?}")]
    InvalidName(String),

    #[error("artifact not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Where a persisted document lives and what it hashed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLocator {
    /// `<run_id>/<name>`, relative to the store root.
    pub path: String,
    /// SHA-256 of the stored bytes, hex-encoded.
    pub digest: String,
}

impl ArtifactLocator {
    pub(crate) fn new(run_id: &str, name: &str, bytes: &[u8]) -> Self {
        Self {
            path: format!("{run_id}/{name}"),
            digest: sha256_hex(bytes),
        }
    }
}

/// Hex-encoded SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Stored form of a document: pretty JSON.
pub(crate) fn encode(document: &serde_json::Value) -> Result<Vec<u8>, StoreError> {
    Ok(serde_json::to_vec_pretty(document)?)
}

/// Reject names that could escape the run partition.
pub(crate) fn check_name(name: &str) -> Result<(), StoreError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(|c| matches!(c, '/' | '\\' | '\0'));
    if bad {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist `document` as `name` under `run_id`. Never overwrites.
    async fn persist(
        &self,
        run_id: &str,
        name: &str,
        document: &serde_json::Value,
    ) -> Result<ArtifactLocator, StoreError>;

    /// Trace log for `run_id`'s tool authorization decisions.
    fn trace_log(&self, run_id: &str) -> Arc<dyn TraceRecorder>;
}

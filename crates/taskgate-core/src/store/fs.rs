use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::NamedTempFile;

use crate::capability::{JsonlTraceLog, TraceRecorder};

use super::{check_name, encode, ArtifactLocator, ArtifactStore, StoreError};

/// Filesystem-backed artifact store.
///
/// Layout: `<root>/<run_id>/<name>`. Writes go to a temp file in the run
/// directory and are moved into place without clobbering.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Create a store rooted at `root`, creating it if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root.join(run_id)
    }

    /// Read back a persisted document.
    pub fn read(&self, locator: &ArtifactLocator) -> Result<serde_json::Value, StoreError> {
        let path = self.root.join(&locator.path);
        let bytes = fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(locator.path.clone())
            } else {
                StoreError::Io(e)
            }
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn write_noclobber(dir: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist_noclobber(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn persist(
        &self,
        run_id: &str,
        name: &str,
        document: &serde_json::Value,
    ) -> Result<ArtifactLocator, StoreError> {
        check_name(run_id)?;
        check_name(name)?;
        let bytes = encode(document)?;
        let locator = ArtifactLocator::new(run_id, name, &bytes);

        let dir = self.run_dir(run_id);
        let path = dir.join(name);
        let written = tokio::task::spawn_blocking(move || write_noclobber(&dir, &path, &bytes))
            .await
            .map_err(std::io::Error::other)?;

        match written {
            Ok(()) => Ok(locator),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(StoreError::AlreadyExists {
                    run_id: run_id.to_string(),
                    name: name.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn trace_log(&self, run_id: &str) -> Arc<dyn TraceRecorder> {
        Arc::new(JsonlTraceLog::for_run(&self.root, run_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_store() -> (tempfile::TempDir, FsArtifactStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_persist_and_read_back() {
        let (_dir, store) = make_store();
        let doc = json!({"status": "pass"});
        let loc = store.persist("run-1", "final_release.json", &doc).await.unwrap();
        assert_eq!(loc.path, "run-1/final_release.json");
        assert_eq!(store.read(&loc).unwrap(), doc);

        let bytes = std::fs::read(store.root().join(&loc.path)).unwrap();
        assert_eq!(loc.digest, crate::store::sha256_hex(&bytes));
    }

    #[tokio::test]
    async fn test_refuses_to_overwrite() {
        let (_dir, store) = make_store();
        store.persist("run-1", "a.json", &json!(1)).await.unwrap();
        let err = store.persist("run-1", "a.json", &json!(2)).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));

        let loc = ArtifactLocator::new("run-1", "a.json", b"");
        assert_eq!(store.read(&loc).unwrap(), json!(1));
    }

    #[tokio::test]
    async fn test_runs_are_partitioned() {
        let (_dir, store) = make_store();
        store.persist("run-1", "a.json", &json!(1)).await.unwrap();
        store.persist("run-2", "a.json", &json!(2)).await.unwrap();
        assert!(store.run_dir("run-1").join("a.json").exists());
        assert!(store.run_dir("run-2").join("a.json").exists());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let (_dir, store) = make_store();
        let err = store.persist("run-1", "../escape.json", &json!(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidName(_)));
    }

    #[test]
    fn test_missing_artifact_is_not_found() {
        let (_dir, store) = make_store();
        let loc = ArtifactLocator::new("ghost", "x.json", b"");
        assert!(matches!(store.read(&loc), Err(StoreError::NotFound(_))));
    }
}

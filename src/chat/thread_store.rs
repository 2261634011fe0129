//! Durable storage for thread handles.
//!
//! A session reads its handle once when it is created and writes it every
//! time the remote side issues a new one. Keys are namespaces, so separate
//! users or windows can keep separate conversations in one store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use super::model::ThreadHandle;
use crate::error::ChatError;

/// Key used when nothing more specific is configured.
pub const DEFAULT_NAMESPACE: &str = "plan_builder.thread_id";

/// Get/set/clear access to persisted thread handles.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    async fn get(&self, namespace: &str) -> Result<Option<ThreadHandle>, ChatError>;

    async fn set(&self, namespace: &str, handle: &ThreadHandle) -> Result<(), ChatError>;

    async fn clear(&self, namespace: &str) -> Result<(), ChatError>;
}

/// Process-local store, mostly for tests.
#[derive(Default)]
pub struct MemoryThreadStore {
    handles: RwLock<HashMap<String, ThreadHandle>>,
}

impl MemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThreadStore for MemoryThreadStore {
    async fn get(&self, namespace: &str) -> Result<Option<ThreadHandle>, ChatError> {
        Ok(self.handles.read().await.get(namespace).cloned())
    }

    async fn set(&self, namespace: &str, handle: &ThreadHandle) -> Result<(), ChatError> {
        self.handles
            .write()
            .await
            .insert(namespace.to_string(), handle.clone());
        Ok(())
    }

    async fn clear(&self, namespace: &str) -> Result<(), ChatError> {
        self.handles.write().await.remove(namespace);
        Ok(())
    }
}

/// JSON file holding one handle per namespace.
///
/// Writes go through a temp file and a rename. Two processes writing the
/// same file race; the last write wins.
pub struct FileThreadStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileThreadStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Option<String>, ChatError> {
        match fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(None),
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ChatError::Store(format!(
                "read {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn load(&self) -> Result<HashMap<String, ThreadHandle>, ChatError> {
        let Some(text) = self.read().await? else {
            return Ok(HashMap::new());
        };
        serde_json::from_str(&text).map_err(|e| {
            ChatError::Store(format!("corrupt thread store {}: {e}", self.path.display()))
        })
    }

    /// Like `load`, but an unparseable file counts as empty so the next
    /// save overwrites it.
    async fn load_for_update(&self) -> Result<HashMap<String, ThreadHandle>, ChatError> {
        let Some(text) = self.read().await? else {
            return Ok(HashMap::new());
        };
        match serde_json::from_str(&text) {
            Ok(handles) => Ok(handles),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Discarding corrupt thread store");
                Ok(HashMap::new())
            }
        }
    }

    async fn save(&self, handles: &HashMap<String, ThreadHandle>) -> Result<(), ChatError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ChatError::Store(format!("create {}: {e}", parent.display())))?;
        }
        let json = serde_json::to_string_pretty(handles)
            .map_err(|e| ChatError::Store(format!("serialize thread store: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .await
            .map_err(|e| ChatError::Store(format!("write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| ChatError::Store(format!("rename to {}: {e}", self.path.display())))?;
        debug!(path = %self.path.display(), "Thread store saved");
        Ok(())
    }
}

#[async_trait]
impl ThreadStore for FileThreadStore {
    async fn get(&self, namespace: &str) -> Result<Option<ThreadHandle>, ChatError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(namespace))
    }

    async fn set(&self, namespace: &str, handle: &ThreadHandle) -> Result<(), ChatError> {
        let _guard = self.lock.lock().await;
        let mut handles = self.load_for_update().await?;
        handles.insert(namespace.to_string(), handle.clone());
        self.save(&handles).await
    }

    async fn clear(&self, namespace: &str) -> Result<(), ChatError> {
        let _guard = self.lock.lock().await;
        let mut handles = self.load_for_update().await?;
        if handles.remove(namespace).is_some() {
            self.save(&handles).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_get_set_clear() {
        let store = MemoryThreadStore::new();
        assert!(store.get(DEFAULT_NAMESPACE).await.unwrap().is_none());

        store
            .set(DEFAULT_NAMESPACE, &ThreadHandle::new("t1"))
            .await
            .unwrap();
        assert_eq!(
            store.get(DEFAULT_NAMESPACE).await.unwrap(),
            Some(ThreadHandle::new("t1"))
        );

        store.clear(DEFAULT_NAMESPACE).await.unwrap();
        assert!(store.get(DEFAULT_NAMESPACE).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_store_persists_across_instances() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("threads.json");

        let store = FileThreadStore::new(&path);
        store.set("a", &ThreadHandle::new("thread-a")).await.unwrap();
        store.set("b", &ThreadHandle::new("thread-b")).await.unwrap();
        assert!(path.exists());

        let reopened = FileThreadStore::new(&path);
        assert_eq!(
            reopened.get("a").await.unwrap(),
            Some(ThreadHandle::new("thread-a"))
        );
        assert_eq!(
            reopened.get("b").await.unwrap(),
            Some(ThreadHandle::new("thread-b"))
        );
    }

    #[tokio::test]
    async fn file_store_last_write_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("threads.json");
        let first = FileThreadStore::new(&path);
        let second = FileThreadStore::new(&path);

        first.set("ns", &ThreadHandle::new("one")).await.unwrap();
        second.set("ns", &ThreadHandle::new("two")).await.unwrap();

        assert_eq!(first.get("ns").await.unwrap(), Some(ThreadHandle::new("two")));
    }

    #[tokio::test]
    async fn file_store_clear_only_touches_namespace() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileThreadStore::new(tmp.path().join("threads.json"));
        store.set("keep", &ThreadHandle::new("k")).await.unwrap();
        store.set("drop", &ThreadHandle::new("d")).await.unwrap();

        store.clear("drop").await.unwrap();
        store.clear("missing").await.unwrap();

        assert!(store.get("drop").await.unwrap().is_none());
        assert_eq!(store.get("keep").await.unwrap(), Some(ThreadHandle::new("k")));
    }

    #[tokio::test]
    async fn file_store_missing_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileThreadStore::new(tmp.path().join("absent.json"));
        assert!(store.get(DEFAULT_NAMESPACE).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_store_corrupt_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("threads.json");
        std::fs::write(&path, "not json").unwrap();
        let store = FileThreadStore::new(&path);
        assert!(matches!(
            store.get(DEFAULT_NAMESPACE).await,
            Err(ChatError::Store(_))
        ));
    }

    #[tokio::test]
    async fn file_store_set_replaces_corrupt_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("threads.json");
        std::fs::write(&path, "{ truncated").unwrap();
        let store = FileThreadStore::new(&path);

        store
            .set(DEFAULT_NAMESPACE, &ThreadHandle::new("fresh"))
            .await
            .unwrap();

        let reopened = FileThreadStore::new(&path);
        assert_eq!(
            reopened.get(DEFAULT_NAMESPACE).await.unwrap(),
            Some(ThreadHandle::new("fresh"))
        );
    }
}

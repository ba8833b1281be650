//! File-backed key-value store: one file per key under a root directory.

use super::KeyValueStore;
use crate::error::StoreError;
use async_trait::async_trait;
use log::{debug, info};
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Key-value store writing each key to `<root>/<encoded key>.json`.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    /// Root directory for stored keys.
    root: PathBuf,
}

impl FileKeyValueStore {
    /// Create a store under `root`, creating the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        info!("initialized file key-value store (root={})", root.display());
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", encode_key(key)))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json.tmp", encode_key(key)))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.key_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Write through a temp file and rename so readers never see a partial value.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.key_path(key);
        let temp_path = self.temp_path(key);
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        std::fs::rename(temp_path, &path)?;
        debug!("stored key (key={}, bytes={})", key, value.len());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn location(&self, key: &str) -> Option<PathBuf> {
        Some(self.key_path(key))
    }
}

/// Percent-encode anything outside `[A-Za-z0-9_-]` so keys map to safe file names.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            encoded.push(byte as char);
        } else {
            let _ = write!(encoded, "%{byte:02X}");
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn encodes_reserved_characters() {
        assert_eq!(encode_key("@notifications"), "%40notifications");
        assert_eq!(encode_key("../etc"), "%2E%2E%2Fetc");
        assert_eq!(encode_key("plain_key-1"), "plain_key-1");
    }

    #[tokio::test]
    async fn set_get_remove_round_trip() {
        let temp = tempdir().expect("tempdir");
        let store = FileKeyValueStore::new(temp.path().join("data")).expect("store");

        assert_eq!(store.get_item("@notifications").await.expect("get"), None);
        store
            .set_item("@notifications", "[]")
            .await
            .expect("set");
        store
            .set_item("@notifications", "[{\"id\":\"1\"}]")
            .await
            .expect("overwrite");
        assert_eq!(
            store.get_item("@notifications").await.expect("get"),
            Some("[{\"id\":\"1\"}]".to_string())
        );

        let location = store.location("@notifications").expect("location");
        assert!(location.exists());
        assert!(!location.with_extension("json.tmp").exists());

        store.remove_item("@notifications").await.expect("remove");
        store.remove_item("@notifications").await.expect("remove twice");
        assert_eq!(store.get_item("@notifications").await.expect("get"), None);
    }

    #[tokio::test]
    async fn keys_do_not_escape_root() {
        let temp = tempdir().expect("tempdir");
        let store = FileKeyValueStore::new(temp.path()).expect("store");
        store.set_item("../outside", "x").await.expect("set");
        let location = store.location("../outside").expect("location");
        assert_eq!(location.parent(), Some(temp.path()));
    }
}

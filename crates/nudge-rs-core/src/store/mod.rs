//! Key-value persistence and the reminder collection stored on top of it.

mod file;
mod reminders;

pub use file::FileKeyValueStore;
pub use reminders::ReminderStore;

use crate::error::StoreError;
use async_trait::async_trait;
use std::path::PathBuf;

#[async_trait]
/// Device-local string key-value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`; deleting a missing key is not an error.
    async fn remove_item(&self, key: &str) -> Result<(), StoreError>;

    /// Where `key` lives on disk, for stores that have one.
    fn location(&self, _key: &str) -> Option<PathBuf> {
        None
    }
}

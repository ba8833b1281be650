//! The reminder collection persisted as one JSON array under a single key.

use super::KeyValueStore;
use crate::error::StoreError;
use crate::types::Reminder;
use log::{debug, info, warn};
use nudge_rs_config::StorageConfig;
use std::path::PathBuf;
use std::sync::Arc;

/// Reads and rewrites the whole reminder array on every change.
#[derive(Clone)]
pub struct ReminderStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl ReminderStore {
    /// Bind the collection to `key` in the given key-value store.
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    /// Bind the collection using the configured storage key.
    pub fn from_config(kv: Arc<dyn KeyValueStore>, config: &StorageConfig) -> Self {
        Self::new(kv, config.key.clone())
    }

    /// Storage key holding the collection.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// On-disk location of the collection, when the backend has one.
    pub fn location(&self) -> Option<PathBuf> {
        self.kv.location(&self.key)
    }

    /// Load the collection in stored order.
    ///
    /// A missing key, unreadable backend or malformed JSON yields an empty list.
    pub async fn load(&self) -> Vec<Reminder> {
        match self.try_load().await {
            Ok(reminders) => reminders,
            Err(err) => {
                warn!("failed to load reminders (key={}): {err}", self.key);
                Vec::new()
            }
        }
    }

    /// Load the collection, surfacing read and decode errors.
    pub async fn try_load(&self) -> Result<Vec<Reminder>, StoreError> {
        let Some(raw) = self.kv.get_item(&self.key).await? else {
            return Ok(Vec::new());
        };
        let reminders: Vec<Reminder> = serde_json::from_str(&raw)?;
        debug!(
            "loaded reminders (key={}, count={})",
            self.key,
            reminders.len()
        );
        Ok(reminders)
    }

    /// Append a reminder and persist the full collection.
    ///
    /// An unreadable collection is an error; it is never overwritten.
    pub async fn append(&self, reminder: Reminder) -> Result<Vec<Reminder>, StoreError> {
        let mut reminders = self.try_load().await?;
        let id = reminder.id.clone();
        reminders.push(reminder);
        self.write(&reminders).await?;
        info!("stored reminder (id={}, count={})", id, reminders.len());
        Ok(reminders)
    }

    /// Remove the reminder with `id`. A missing id leaves storage untouched.
    pub async fn remove(&self, id: &str) -> Result<Vec<Reminder>, StoreError> {
        let mut reminders = self.try_load().await?;
        let before = reminders.len();
        reminders.retain(|reminder| reminder.id != id);
        if reminders.len() == before {
            debug!("reminder not found, nothing removed (id={id})");
            return Ok(reminders);
        }
        self.write(&reminders).await?;
        info!("removed reminder (id={}, count={})", id, reminders.len());
        Ok(reminders)
    }

    /// Drop the whole collection.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.kv.remove_item(&self.key).await?;
        info!("cleared reminders (key={})", self.key);
        Ok(())
    }

    async fn write(&self, reminders: &[Reminder]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(reminders)?;
        self.kv.set_item(&self.key, &raw).await
    }
}

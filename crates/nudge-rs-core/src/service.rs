//! Create and delete flows tying storage and scheduling together.

use crate::clock::Clock;
use crate::error::ReminderError;
use crate::interval::{IntervalChoice, countdown_label};
use crate::scheduler::SchedulerAdapter;
use crate::store::ReminderStore;
use crate::types::Reminder;
use log::{debug, info, warn};
use std::sync::Arc;

/// User input for a new reminder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderDraft {
    pub title: String,
    pub description: String,
    /// Stored interval value, see [`IntervalChoice::value`].
    pub interval: String,
}

impl ReminderDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        interval: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            interval: interval.into(),
        }
    }

    /// Check required fields and resolve the interval choice.
    pub fn validate(&self) -> Result<IntervalChoice, ReminderError> {
        if self.title.trim().is_empty() || self.description.trim().is_empty() {
            return Err(ReminderError::Validation(
                "Please enter both title and description.".to_string(),
            ));
        }
        IntervalChoice::parse(&self.interval).ok_or_else(|| {
            ReminderError::Validation(format!("Unsupported interval: {}", self.interval))
        })
    }
}

/// Reminder operations used by the UI.
#[derive(Clone)]
pub struct ReminderService {
    store: ReminderStore,
    scheduler: SchedulerAdapter,
    clock: Arc<dyn Clock>,
}

impl ReminderService {
    pub fn new(store: ReminderStore, scheduler: SchedulerAdapter, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            scheduler,
            clock,
        }
    }

    pub fn store(&self) -> &ReminderStore {
        &self.store
    }

    pub fn scheduler(&self) -> &SchedulerAdapter {
        &self.scheduler
    }

    /// Current time according to the service clock.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// All stored reminders in creation order.
    pub async fn list(&self) -> Vec<Reminder> {
        self.store.load().await
    }

    /// Validate, schedule and persist a new reminder.
    ///
    /// Nothing is scheduled when the collection cannot be read, and nothing
    /// is stored when scheduling fails. When storing fails the freshly
    /// scheduled notification is cancelled again.
    pub async fn create(&self, draft: ReminderDraft) -> Result<Reminder, ReminderError> {
        let choice = draft.validate()?;
        let created_at = self.clock.now_ms();
        let existing = self.store.try_load().await?;
        let mut reminder = Reminder {
            id: unique_id(created_at, &existing),
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            interval: choice.value(),
            created_at,
            notification_id: None,
        };

        let notification_id = self.scheduler.schedule(&reminder).await?;
        reminder.notification_id = Some(notification_id.clone());

        if let Err(err) = self.store.append(reminder.clone()).await {
            if let Err(cancel_err) = self.scheduler.cancel(&notification_id).await {
                warn!(
                    "failed to cancel orphaned notification (id={}): {cancel_err}",
                    reminder.id
                );
            }
            return Err(err.into());
        }
        info!(
            "created reminder (id={}, interval={})",
            reminder.id, reminder.interval
        );
        Ok(reminder)
    }

    /// Cancel the reminder's notification, if any, and remove it from storage.
    ///
    /// A failed cancellation is logged and the record is still removed.
    /// An unreadable collection fails before anything is cancelled.
    /// Returns the collection after removal.
    pub async fn delete(&self, id: &str) -> Result<Vec<Reminder>, ReminderError> {
        let reminders = self.store.try_load().await?;
        let notification_id = reminders
            .iter()
            .find(|reminder| reminder.id == id)
            .and_then(|reminder| reminder.notification_id.clone());

        if let Some(notification_id) = notification_id
            && let Err(err) = self.scheduler.cancel(&notification_id).await
        {
            warn!("failed to cancel notification (id={id}): {err}");
        }

        let updated = self.store.remove(id).await?;
        info!("deleted reminder (id={}, remaining={})", id, updated.len());
        Ok(updated)
    }

    /// Cancel every stored notification, then drop the collection.
    pub async fn clear_all(&self) -> Result<(), ReminderError> {
        let reminders = self.store.try_load().await?;
        for reminder in &reminders {
            if let Some(notification_id) = reminder.notification_id.as_deref()
                && let Err(err) = self.scheduler.cancel(notification_id).await
            {
                warn!("failed to cancel notification (id={}): {err}", reminder.id);
            }
        }
        self.store.clear().await?;
        info!("cleared reminders (count={})", reminders.len());
        Ok(())
    }

    /// Re-arm the notification of every stored reminder.
    ///
    /// Run once at startup, after notification setup. Each notification is
    /// re-armed under its stored identifier with triggers aligned to the
    /// reminder's creation time. Records without a notification id are skipped
    /// since delete would never cancel them. Failures are logged; storage is
    /// never written. Returns the number scheduled.
    pub async fn restore(&self) -> usize {
        let reminders = self.store.load().await;
        let mut restored = 0;
        for reminder in &reminders {
            let Some(notification_id) = reminder.notification_id.as_deref() else {
                debug!("skipping reminder without notification (id={})", reminder.id);
                continue;
            };
            match self.scheduler.schedule_as(reminder, notification_id).await {
                Ok(_) => restored += 1,
                Err(err) => warn!("failed to restore reminder (id={}): {err}", reminder.id),
            }
        }
        info!(
            "restored reminder notifications (restored={}, total={})",
            restored,
            reminders.len()
        );
        restored
    }

    /// Countdown label for each reminder, keyed by id.
    pub fn countdowns(&self, reminders: &[Reminder]) -> Vec<(String, String)> {
        let now = self.clock.now_ms();
        reminders
            .iter()
            .map(|reminder| (reminder.id.clone(), countdown_label(reminder, now)))
            .collect()
    }
}

/// Creation timestamp as id, suffixed when another reminder already has it.
fn unique_id(created_at: i64, existing: &[Reminder]) -> String {
    let base = created_at.to_string();
    let taken = |candidate: &str| existing.iter().any(|reminder| reminder.id == candidate);
    let mut candidate = base.clone();
    let mut suffix = 0u32;
    while taken(&candidate) {
        suffix += 1;
        candidate = format!("{base}-{suffix}");
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stored(id: &str) -> Reminder {
        Reminder {
            id: id.to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            interval: "1".to_string(),
            created_at: 5,
            notification_id: None,
        }
    }

    #[test]
    fn draft_requires_title_and_description() {
        let err = ReminderDraft::new("  ", "body", "1").validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation error: Please enter both title and description."
        );
        assert!(ReminderDraft::new("title", "", "1").validate().is_err());
    }

    #[test]
    fn draft_rejects_fractional_hours() {
        let err = ReminderDraft::new("title", "body", "1.5")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ReminderError::Validation(_)));
    }

    #[test]
    fn draft_resolves_interval_choice() {
        let choice = ReminderDraft::new("title", "body", "0.00833")
            .validate()
            .expect("valid");
        assert_eq!(choice, IntervalChoice::Testing);
    }

    #[test]
    fn unique_id_appends_suffix_on_collision() {
        assert_eq!(unique_id(5, &[]), "5");
        assert_eq!(unique_id(5, &[stored("5")]), "5-1");
        assert_eq!(unique_id(5, &[stored("5"), stored("5-1")]), "5-2");
    }
}

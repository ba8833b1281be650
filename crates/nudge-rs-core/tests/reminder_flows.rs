//! Create/delete reminder flows against a recording platform and in-memory storage.

use nudge_rs_config::NudgeConfig;
use nudge_rs_core::{
    NotificationTrigger, Reminder, ReminderDraft, ReminderError, ReminderService, ReminderStore,
    SchedulerAdapter,
};
use nudge_rs_test_utils::{FixedClock, MemoryKeyValueStore, PlatformCall, RecordingPlatform};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const T: i64 = 1_700_000_000_000;
const KEY: &str = "@notifications";

struct Harness {
    platform: Arc<RecordingPlatform>,
    kv: Arc<MemoryKeyValueStore>,
    clock: Arc<FixedClock>,
    service: ReminderService,
}

fn harness_with(kv: MemoryKeyValueStore) -> Harness {
    let config = NudgeConfig::default();
    let platform = Arc::new(RecordingPlatform::new());
    let kv = Arc::new(kv);
    let clock = Arc::new(FixedClock::new(T));
    let store = ReminderStore::from_config(kv.clone(), &config.storage);
    let scheduler = SchedulerAdapter::new(platform.clone(), clock.clone(), &config.notifications);
    let service = ReminderService::new(store, scheduler, clock.clone());
    Harness {
        platform,
        kv,
        clock,
        service,
    }
}

fn harness() -> Harness {
    harness_with(MemoryKeyValueStore::new())
}

fn draft(interval: &str) -> ReminderDraft {
    ReminderDraft::new("Drink water", "Stay hydrated", interval)
}

/// Creating schedules first, then stores the record with its notification id.
#[tokio::test]
async fn create_schedules_then_stores() {
    let h = harness();
    let reminder = h.service.create(draft("0.00833")).await.expect("create");

    assert_eq!(reminder.id, T.to_string());
    assert_eq!(reminder.notification_id.as_deref(), Some(reminder.id.as_str()));
    assert_eq!(reminder.interval, "0.00833");
    assert_eq!(reminder.created_at, T);

    assert_eq!(
        h.platform.scheduled_triggers(),
        vec![(
            T.to_string(),
            NotificationTrigger {
                delay_secs: 30,
                repeat_every_secs: Some(30),
                channel_id: "high-priority".to_string(),
            }
        )]
    );
    assert_eq!(h.platform.cancelled(), vec![T.to_string()]);
    assert_eq!(h.service.list().await, vec![reminder]);
}

/// Notification content carries the title, description and configured priority.
#[tokio::test]
async fn scheduled_content_matches_reminder() {
    let h = harness();
    h.service.create(draft("2")).await.expect("create");

    let content = h
        .platform
        .calls()
        .into_iter()
        .find_map(|call| match call {
            PlatformCall::Schedule { content, .. } => Some(content),
            _ => None,
        })
        .expect("schedule call");
    assert_eq!(content.title, "Drink water");
    assert_eq!(content.body, "Stay hydrated");
    assert_eq!(
        content.priority,
        nudge_rs_config::NotificationPriority::High
    );
}

/// A reminder rescheduled mid-interval fires on the next creation-aligned boundary.
#[tokio::test]
async fn trigger_is_aligned_to_creation_time() {
    let h = harness();
    let reminder = Reminder {
        id: "r".to_string(),
        title: "t".to_string(),
        description: "d".to_string(),
        interval: "1".to_string(),
        created_at: T,
        notification_id: None,
    };
    let trigger = h
        .service
        .scheduler()
        .trigger_for(&reminder, T + 5_400_000)
        .expect("trigger");
    assert_eq!(trigger.delay_secs, 1_800);
    assert_eq!(trigger.repeat_every_secs, Some(3_600));
}

/// Missing title or description fails before any platform or storage call.
#[tokio::test]
async fn validation_failure_touches_nothing() {
    let h = harness();
    let err = h
        .service
        .create(ReminderDraft::new("", "body", "1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReminderError::Validation(_)));
    assert!(h.platform.calls().is_empty());
    assert_eq!(h.kv.write_count(), 0);
}

/// A scheduling failure leaves storage unchanged.
#[tokio::test]
async fn scheduling_failure_stores_nothing() {
    let h = harness();
    h.platform.set_fail_schedule(true);
    let err = h.service.create(draft("1")).await.unwrap_err();
    assert!(matches!(err, ReminderError::Scheduling(_)));
    assert_eq!(h.kv.raw(KEY), None);
    assert!(h.service.list().await.is_empty());
}

/// A storage failure cancels the notification that was just scheduled.
#[tokio::test]
async fn storage_failure_cancels_orphaned_notification() {
    let h = harness();
    h.kv.set_fail_writes(true);
    let err = h.service.create(draft("1")).await.unwrap_err();
    assert!(matches!(err, ReminderError::Storage(_)));
    assert_eq!(h.platform.cancelled(), vec![T.to_string(), T.to_string()]);
}

/// Deleting cancels by the stored notification id and removes the record.
#[tokio::test]
async fn delete_cancels_and_removes() {
    let h = harness();
    let reminder = h.service.create(draft("1")).await.expect("create");
    h.platform.clear_calls();

    let remaining = h.service.delete(&reminder.id).await.expect("delete");
    assert!(remaining.is_empty());
    assert_eq!(h.platform.cancelled(), vec![reminder.id.clone()]);
    assert_eq!(h.kv.raw(KEY).as_deref(), Some("[]"));
}

/// Records without a notification id are removed without any cancel call.
#[tokio::test]
async fn delete_without_notification_id_skips_cancel() {
    let raw = format!(
        "[{{\"id\":\"legacy\",\"title\":\"t\",\"description\":\"d\",\"interval\":\"4\",\"createdAt\":{T}}}]"
    );
    let h = harness_with(MemoryKeyValueStore::with_item(KEY, raw));

    let remaining = h.service.delete("legacy").await.expect("delete");
    assert!(remaining.is_empty());
    assert!(h.platform.cancelled().is_empty());
}

/// A failed cancellation is logged and the record is still removed.
#[tokio::test]
async fn delete_removes_even_when_cancel_fails() {
    let h = harness();
    let reminder = h.service.create(draft("1")).await.expect("create");
    h.platform.set_fail_cancel(true);

    let remaining = h.service.delete(&reminder.id).await.expect("delete");
    assert!(remaining.is_empty());
    assert!(h.service.list().await.is_empty());
}

/// Deleting an unknown id cancels nothing and writes nothing.
#[tokio::test]
async fn delete_unknown_id_is_noop() {
    let h = harness();
    h.service.create(draft("1")).await.expect("create");
    h.platform.clear_calls();
    let writes = h.kv.write_count();

    let remaining = h.service.delete("missing").await.expect("delete");
    assert_eq!(remaining.len(), 1);
    assert!(h.platform.cancelled().is_empty());
    assert_eq!(h.kv.write_count(), writes);
}

/// Deleting one reminder leaves the other's schedule alone.
#[tokio::test]
async fn reminders_are_independent() {
    let h = harness();
    let first = h.service.create(draft("1")).await.expect("first");
    h.clock.advance(1_000);
    let second = h.service.create(draft("0.00833")).await.expect("second");
    assert_ne!(first.id, second.id);
    h.platform.clear_calls();

    let remaining = h.service.delete(&first.id).await.expect("delete");
    assert_eq!(remaining, vec![second]);
    assert_eq!(h.platform.cancelled(), vec![first.id]);
}

/// Two reminders created in the same millisecond still get distinct ids.
#[tokio::test]
async fn same_millisecond_ids_are_unique() {
    let h = harness();
    let first = h.service.create(draft("1")).await.expect("first");
    let second = h.service.create(draft("1")).await.expect("second");
    assert_eq!(first.id, T.to_string());
    assert_eq!(second.id, format!("{T}-1"));
}

/// Countdowns follow the service clock.
#[tokio::test]
async fn countdowns_track_clock() {
    let h = harness();
    let reminder = h.service.create(draft("0.00833")).await.expect("create");
    h.clock.advance(15_000);
    let reminders = h.service.list().await;
    assert_eq!(
        h.service.countdowns(&reminders),
        vec![(reminder.id, "in 15s".to_string())]
    );
}

/// Unreadable storage shows as an empty list.
#[tokio::test]
async fn unreadable_storage_lists_empty() {
    let h = harness_with(MemoryKeyValueStore::with_item(KEY, "not json"));
    assert!(h.service.list().await.is_empty());
    h.kv.set_fail_reads(true);
    assert!(h.service.list().await.is_empty());
}

/// Clearing cancels every scheduled notification and empties storage.
#[tokio::test]
async fn clear_all_cancels_everything() {
    let h = harness();
    let first = h.service.create(draft("1")).await.expect("first");
    h.clock.advance(1);
    let second = h.service.create(draft("2")).await.expect("second");
    h.platform.clear_calls();

    h.service.clear_all().await.expect("clear");
    assert_eq!(h.platform.cancelled(), vec![first.id, second.id]);
    assert_eq!(h.kv.raw(KEY), None);
    assert!(h.service.list().await.is_empty());
}

const SAVED: &str = r#"[{"id":"a","title":"Keep","description":"me","interval":"1","createdAt":1699994600000,"notificationId":"a"}]"#;

/// A failed read during create leaves saved reminders untouched and schedules nothing.
#[tokio::test]
async fn create_with_unreadable_storage_keeps_saved_reminders() {
    let h = harness_with(MemoryKeyValueStore::with_item(KEY, SAVED));
    h.kv.set_fail_reads(true);

    let err = h.service.create(draft("1")).await.unwrap_err();
    assert!(matches!(err, ReminderError::Storage(_)));
    assert_eq!(h.kv.raw(KEY).as_deref(), Some(SAVED));
    assert_eq!(h.kv.write_count(), 0);
    assert!(h.platform.calls().is_empty());
}

/// Corrupt saved data is reported on create instead of being replaced.
#[tokio::test]
async fn create_with_corrupt_storage_keeps_raw_value() {
    let h = harness_with(MemoryKeyValueStore::with_item(KEY, "not json"));

    let err = h.service.create(draft("1")).await.unwrap_err();
    assert!(matches!(err, ReminderError::Storage(_)));
    assert_eq!(h.kv.raw(KEY).as_deref(), Some("not json"));
    assert!(h.platform.scheduled_triggers().is_empty());
}

/// A failed read during delete cancels nothing and writes nothing.
#[tokio::test]
async fn delete_with_unreadable_storage_keeps_saved_reminders() {
    let h = harness_with(MemoryKeyValueStore::with_item(KEY, SAVED));
    h.kv.set_fail_reads(true);

    let err = h.service.delete("a").await.unwrap_err();
    assert!(matches!(err, ReminderError::Storage(_)));
    assert_eq!(h.kv.raw(KEY).as_deref(), Some(SAVED));
    assert!(h.platform.calls().is_empty());
}

/// A failed read during clear leaves notifications and storage alone.
#[tokio::test]
async fn clear_all_with_unreadable_storage_keeps_saved_reminders() {
    let h = harness_with(MemoryKeyValueStore::with_item(KEY, SAVED));
    h.kv.set_fail_reads(true);

    assert!(h.service.clear_all().await.is_err());
    assert_eq!(h.kv.raw(KEY).as_deref(), Some(SAVED));
    assert!(h.platform.calls().is_empty());
}

/// Restoring re-arms saved reminders on their creation-aligned schedule without writing.
#[tokio::test]
async fn restore_rearms_saved_reminders() {
    let h = harness_with(MemoryKeyValueStore::with_item(KEY, SAVED));

    assert_eq!(h.service.restore().await, 1);
    assert_eq!(
        h.platform.scheduled_triggers(),
        vec![(
            "a".to_string(),
            NotificationTrigger {
                delay_secs: 1_800,
                repeat_every_secs: Some(3_600),
                channel_id: "high-priority".to_string(),
            }
        )]
    );
    assert_eq!(h.kv.raw(KEY).as_deref(), Some(SAVED));
    assert_eq!(h.kv.write_count(), 0);
}

/// Restore uses the stored notification id and skips records without one.
#[tokio::test]
async fn restore_uses_stored_notification_ids() {
    let raw = r#"[
        {"id":"a","title":"t","description":"d","interval":"1","createdAt":1699994600000,"notificationId":"legacy-a"},
        {"id":"b","title":"t","description":"d","interval":"2","createdAt":1699994600000}
    ]"#;
    let h = harness_with(MemoryKeyValueStore::with_item(KEY, raw));

    assert_eq!(h.service.restore().await, 1);
    let identifiers: Vec<String> = h
        .platform
        .scheduled_triggers()
        .into_iter()
        .map(|(identifier, _)| identifier)
        .collect();
    assert_eq!(identifiers, vec!["legacy-a".to_string()]);

    h.platform.clear_calls();
    h.service.delete("a").await.expect("delete");
    assert_eq!(h.platform.cancelled(), vec!["legacy-a".to_string()]);
}

/// Scheduling failures during restore are skipped and never touch storage.
#[tokio::test]
async fn restore_tolerates_scheduling_failure() {
    let h = harness_with(MemoryKeyValueStore::with_item(KEY, SAVED));
    h.platform.set_fail_schedule(true);

    assert_eq!(h.service.restore().await, 0);
    assert_eq!(h.kv.raw(KEY).as_deref(), Some(SAVED));
    assert_eq!(h.service.list().await.len(), 1);
}

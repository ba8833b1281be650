//! Core reminder primitives for Nudge.
//!
//! This crate owns the interval arithmetic, the persisted reminder collection,
//! the notification scheduler adapter and the create/delete flows used by the
//! terminal UI.

pub mod clock;
pub mod error;
pub mod interval;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use error::{ReminderError, SchedulerError, StoreError};
pub use interval::{
    IntervalChoice, countdown_label, format_countdown, format_duration, interval_to_millis,
    next_trigger, next_trigger_from_now,
};
/// Notification platform boundary, adapter and the in-process platform.
pub use scheduler::{
    DeliveredNotification, LocalNotificationPlatform, NotificationContent, NotificationPlatform,
    NotificationTrigger, PermissionStatus, ScheduledNotification, SchedulerAdapter, SetupReport,
    initialize_notifications,
};
pub use service::{ReminderDraft, ReminderService};
/// Key-value persistence and the reminder collection.
pub use store::{FileKeyValueStore, KeyValueStore, ReminderStore};
pub use types::Reminder;

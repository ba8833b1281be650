//! Notification scheduling boundary.
//!
//! `NotificationPlatform` is the seam to whatever actually delivers
//! notifications; `SchedulerAdapter` turns reminders into repeating triggers
//! against it.

mod adapter;
mod local;
mod setup;

pub use adapter::SchedulerAdapter;
pub use local::{DeliveredNotification, LocalNotificationPlatform};
pub use setup::{SetupReport, initialize_notifications};

use crate::error::SchedulerError;
use async_trait::async_trait;
use nudge_rs_config::{ChannelConfig, NotificationPriority, PresentationConfig};
use serde::{Deserialize, Serialize};

/// What a notification shows when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub priority: NotificationPriority,
    /// Platform sound name; `None` plays the default sound.
    #[serde(default)]
    pub sound: Option<String>,
}

/// When a notification fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTrigger {
    /// Seconds until the first delivery.
    pub delay_secs: u64,
    /// Period between deliveries after the first; `None` fires once.
    pub repeat_every_secs: Option<u64>,
    /// Channel the notification is posted to.
    pub channel_id: String,
}

impl NotificationTrigger {
    pub fn repeats(&self) -> bool {
        self.repeat_every_secs.is_some()
    }
}

/// Notification permission state reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Undetermined => "undetermined",
        }
    }
}

/// A notification currently registered with the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledNotification {
    pub identifier: String,
    pub content: NotificationContent,
    pub trigger: NotificationTrigger,
    /// Epoch milliseconds of the first delivery.
    pub first_fire_at: i64,
}

#[async_trait]
/// Platform capable of delivering local notifications.
pub trait NotificationPlatform: Send + Sync {
    /// Register a notification under `identifier`, replacing any existing one.
    ///
    /// Returns the identifier the platform will use for later cancellation.
    async fn schedule(
        &self,
        content: NotificationContent,
        trigger: NotificationTrigger,
        identifier: &str,
    ) -> Result<String, SchedulerError>;

    /// Cancel a scheduled notification. Unknown identifiers are a no-op.
    async fn cancel(&self, identifier: &str) -> Result<(), SchedulerError>;

    /// Current permission state without prompting.
    async fn permission_status(&self) -> Result<PermissionStatus, SchedulerError>;

    /// Ask the user for permission to post notifications.
    async fn request_permissions(&self) -> Result<PermissionStatus, SchedulerError>;

    /// Create or update a notification channel.
    async fn ensure_channel(&self, channel: &ChannelConfig) -> Result<(), SchedulerError>;

    /// Set how notifications are presented while the app is in the foreground.
    fn set_presentation(&self, presentation: PresentationConfig);

    /// Channels registered so far.
    async fn channels(&self) -> Result<Vec<ChannelConfig>, SchedulerError> {
        Ok(Vec::new())
    }

    /// Notifications currently scheduled, when the platform can list them.
    async fn scheduled(&self) -> Result<Vec<ScheduledNotification>, SchedulerError> {
        Ok(Vec::new())
    }
}

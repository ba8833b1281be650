//! Configuration schema for Nudge.

use serde::{Deserialize, Serialize};

/// Root config for the Nudge reminder app.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NudgeConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub intervals: IntervalsConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl NudgeConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> NudgeConfigBuilder {
        NudgeConfigBuilder::new()
    }
}

/// Builder for assembling a `NudgeConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct NudgeConfigBuilder {
    config: NudgeConfig,
}

impl NudgeConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: NudgeConfig::default(),
        }
    }

    /// Replace the storage configuration.
    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.config.storage = storage;
        self
    }

    /// Replace the notification configuration.
    pub fn notifications(mut self, notifications: NotificationsConfig) -> Self {
        self.config.notifications = notifications;
        self
    }

    /// Replace the interval picker configuration.
    pub fn intervals(mut self, intervals: IntervalsConfig) -> Self {
        self.config.intervals = intervals;
        self
    }

    /// Replace the terminal UI configuration.
    pub fn ui(mut self, ui: UiConfig) -> Self {
        self.config.ui = ui;
        self
    }

    /// Finalize and return the built `NudgeConfig`.
    pub fn build(self) -> NudgeConfig {
        self.config
    }
}

/// Where and under which key the reminder collection is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory; defaults to `~/.nudge/data` when unset.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_storage_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            key: default_storage_key(),
        }
    }
}

fn default_storage_key() -> String {
    "@notifications".to_string()
}

/// Notification channel, presentation and sound settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotificationsConfig {
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub presentation: PresentationConfig,
    #[serde(default)]
    pub sound: Option<String>,
}

/// Grouping/priority channel notifications are posted to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelConfig {
    #[serde(default = "default_channel_id")]
    pub id: String,
    #[serde(default = "default_channel_name")]
    pub name: String,
    #[serde(default = "default_channel_description")]
    pub description: String,
    #[serde(default)]
    pub importance: NotificationPriority,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            id: default_channel_id(),
            name: default_channel_name(),
            description: default_channel_description(),
            importance: NotificationPriority::default(),
        }
    }
}

fn default_channel_id() -> String {
    "high-priority".to_string()
}

fn default_channel_name() -> String {
    "High Priority Notifications".to_string()
}

fn default_channel_description() -> String {
    "This channel is used for important notifications.".to_string()
}

/// How a delivered notification is presented while the app is in the foreground.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PresentationConfig {
    #[serde(default = "default_true")]
    pub show_alert: bool,
    #[serde(default = "default_true")]
    pub play_sound: bool,
    #[serde(default = "default_true")]
    pub set_badge: bool,
    #[serde(default)]
    pub priority: NotificationPriority,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            show_alert: true,
            play_sound: true,
            set_badge: true,
            priority: NotificationPriority::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Notification priority / channel importance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    Min,
    Low,
    Default,
    #[default]
    High,
    Max,
}

/// Choices offered by the interval picker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntervalsConfig {
    #[serde(default = "default_interval_hours")]
    pub hours: Vec<u32>,
    #[serde(default = "default_true")]
    pub include_testing: bool,
}

impl Default for IntervalsConfig {
    fn default() -> Self {
        Self {
            hours: default_interval_hours(),
            include_testing: true,
        }
    }
}

fn default_interval_hours() -> Vec<u32> {
    vec![1, 2, 3, 4, 6, 8, 12, 24]
}

/// Terminal UI settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiConfig {
    /// Countdown refresh period in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

fn default_tick_ms() -> u64 {
    1000
}

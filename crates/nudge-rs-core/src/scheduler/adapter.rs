//! Turns reminders into repeating notification triggers.

use super::{NotificationContent, NotificationPlatform, NotificationTrigger};
use crate::clock::Clock;
use crate::error::SchedulerError;
use crate::interval::next_trigger;
use crate::types::Reminder;
use log::{debug, error, info};
use nudge_rs_config::{ChannelConfig, NotificationPriority, NotificationsConfig};
use std::sync::Arc;

const TEST_NOTIFICATION_TITLE: &str = "Test Notification";
const TEST_NOTIFICATION_BODY: &str = "Testing sound...";
const TEST_NOTIFICATION_DELAY_SECS: u64 = 2;

/// Schedules reminders on a [`NotificationPlatform`], aligned to their creation time.
#[derive(Clone)]
pub struct SchedulerAdapter {
    platform: Arc<dyn NotificationPlatform>,
    clock: Arc<dyn Clock>,
    channel: ChannelConfig,
    priority: NotificationPriority,
    sound: Option<String>,
}

impl SchedulerAdapter {
    pub fn new(
        platform: Arc<dyn NotificationPlatform>,
        clock: Arc<dyn Clock>,
        config: &NotificationsConfig,
    ) -> Self {
        Self {
            platform,
            clock,
            channel: config.channel.clone(),
            priority: config.presentation.priority,
            sound: config.sound.clone(),
        }
    }

    /// Underlying platform, for permission and diagnostics calls.
    pub fn platform(&self) -> &Arc<dyn NotificationPlatform> {
        &self.platform
    }

    /// Build the trigger for `reminder` at `now`.
    ///
    /// The first delivery lands on the next `created_at + k * interval`
    /// boundary; later deliveries repeat every interval.
    pub fn trigger_for(
        &self,
        reminder: &Reminder,
        now: i64,
    ) -> Result<NotificationTrigger, SchedulerError> {
        let interval_ms = reminder.interval_ms().ok_or_else(|| {
            SchedulerError::InvalidTrigger(format!(
                "interval is not numeric: {:?}",
                reminder.interval
            ))
        })?;
        let next = next_trigger(reminder.created_at, interval_ms, now);
        Ok(NotificationTrigger {
            delay_secs: seconds_until(next, now),
            repeat_every_secs: Some((interval_ms / 1000).max(1)),
            channel_id: self.channel.id.clone(),
        })
    }

    /// Schedule `reminder`, replacing any notification already registered under its id.
    ///
    /// Returns the notification identifier to store on the reminder.
    pub async fn schedule(&self, reminder: &Reminder) -> Result<String, SchedulerError> {
        self.schedule_as(reminder, &reminder.id).await
    }

    /// Schedule `reminder` under an explicit notification identifier.
    ///
    /// Used to re-arm a stored reminder under the identifier it was saved with.
    pub async fn schedule_as(
        &self,
        reminder: &Reminder,
        identifier: &str,
    ) -> Result<String, SchedulerError> {
        match self.schedule_inner(reminder, identifier).await {
            Ok(identifier) => {
                info!(
                    "scheduled reminder notification (id={}, identifier={})",
                    reminder.id, identifier
                );
                Ok(identifier)
            }
            Err(err) => {
                error!("failed to schedule notification (id={}): {err}", reminder.id);
                Err(err)
            }
        }
    }

    async fn schedule_inner(
        &self,
        reminder: &Reminder,
        identifier: &str,
    ) -> Result<String, SchedulerError> {
        self.platform.cancel(identifier).await?;
        let trigger = self.trigger_for(reminder, self.clock.now_ms())?;
        debug!(
            "computed trigger (id={}, delay_secs={}, repeat_every_secs={:?})",
            reminder.id, trigger.delay_secs, trigger.repeat_every_secs
        );
        let content = NotificationContent {
            title: reminder.title.clone(),
            body: reminder.description.clone(),
            priority: self.priority,
            sound: self.sound.clone(),
        };
        self.platform.schedule(content, trigger, identifier).await
    }

    /// Cancel the notification registered under `identifier`.
    pub async fn cancel(&self, identifier: &str) -> Result<(), SchedulerError> {
        self.platform.cancel(identifier).await?;
        debug!("cancelled notification (identifier={identifier})");
        Ok(())
    }

    /// Fire a single max-priority notification a couple of seconds from now.
    pub async fn send_test_notification(&self) -> Result<String, SchedulerError> {
        self.platform.ensure_channel(&self.channel).await?;
        let identifier = format!("test-{}", self.clock.now_ms());
        let content = NotificationContent {
            title: TEST_NOTIFICATION_TITLE.to_string(),
            body: TEST_NOTIFICATION_BODY.to_string(),
            priority: NotificationPriority::Max,
            sound: self.sound.clone(),
        };
        let trigger = NotificationTrigger {
            delay_secs: TEST_NOTIFICATION_DELAY_SECS,
            repeat_every_secs: None,
            channel_id: self.channel.id.clone(),
        };
        let identifier = self.platform.schedule(content, trigger, &identifier).await?;
        info!("scheduled test notification (identifier={identifier})");
        Ok(identifier)
    }
}

/// Whole seconds from `now` until `at`, rounded up and at least one.
fn seconds_until(at: i64, now: i64) -> u64 {
    let diff = at.saturating_sub(now).max(1) as u64;
    diff.div_ceil(1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_until_rounds_up() {
        assert_eq!(seconds_until(1_000, 0), 1);
        assert_eq!(seconds_until(1_001, 0), 2);
        assert_eq!(seconds_until(1, 0), 1);
        assert_eq!(seconds_until(0, 0), 1);
        assert_eq!(seconds_until(7_200_000, 5_400_000), 1_800);
    }
}

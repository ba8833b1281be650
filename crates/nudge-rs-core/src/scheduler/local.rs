//! In-process notification platform driven by tokio timers.

use super::{
    NotificationContent, NotificationPlatform, NotificationTrigger, PermissionStatus,
    ScheduledNotification,
};
use crate::clock::{Clock, SystemClock};
use crate::error::SchedulerError;
use async_trait::async_trait;
use log::{debug, info, warn};
use nudge_rs_config::{ChannelConfig, PresentationConfig};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

const DELIVERY_CHANNEL_CAPACITY: usize = 64;

/// A notification that fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredNotification {
    pub identifier: String,
    pub content: NotificationContent,
    pub channel_id: String,
    /// Presentation in effect at delivery time.
    pub presentation: PresentationConfig,
    /// Epoch milliseconds of delivery.
    pub delivered_at: i64,
    /// Zero for the first delivery, incremented on each repeat.
    pub sequence: u64,
}

struct ScheduledTask {
    notification: ScheduledNotification,
    generation: u64,
    handle: JoinHandle<()>,
}

/// State shared with the timer tasks.
struct Shared {
    tasks: Mutex<HashMap<String, ScheduledTask>>,
    presentation: Mutex<PresentationConfig>,
    sender: broadcast::Sender<DeliveredNotification>,
    clock: Arc<dyn Clock>,
}

impl Shared {
    fn deliver(
        &self,
        identifier: &str,
        content: &NotificationContent,
        channel_id: &str,
        sequence: u64,
    ) {
        let delivered = DeliveredNotification {
            identifier: identifier.to_string(),
            content: content.clone(),
            channel_id: channel_id.to_string(),
            presentation: *self.presentation.lock(),
            delivered_at: self.clock.now_ms(),
            sequence,
        };
        debug!("delivering notification (identifier={identifier}, sequence={sequence})");
        // No subscribers just means nobody is watching right now.
        let _ = self.sender.send(delivered);
    }

    fn finish(&self, identifier: &str, generation: u64) {
        let mut tasks = self.tasks.lock();
        if tasks
            .get(identifier)
            .is_some_and(|task| task.generation == generation)
        {
            tasks.remove(identifier);
        }
    }
}

/// Delivers notifications from background tasks inside the running process.
///
/// Each identifier owns one task: it sleeps until the first delivery, then
/// ticks at the repeat period. Deliveries are published to subscribers.
pub struct LocalNotificationPlatform {
    shared: Arc<Shared>,
    permission: Mutex<PermissionStatus>,
    /// Status handed out when permission is requested.
    grant: PermissionStatus,
    channels: Mutex<Vec<ChannelConfig>>,
    generation: AtomicU64,
}

impl LocalNotificationPlatform {
    /// Platform using the system clock that grants permission on request.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let (sender, _) = broadcast::channel(DELIVERY_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                tasks: Mutex::new(HashMap::new()),
                presentation: Mutex::new(PresentationConfig::default()),
                sender,
                clock,
            }),
            permission: Mutex::new(PermissionStatus::Undetermined),
            grant: PermissionStatus::Granted,
            channels: Mutex::new(Vec::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Answer permission requests with `status` instead of granting.
    pub fn with_permission_response(mut self, status: PermissionStatus) -> Self {
        self.grant = status;
        self
    }

    /// Receive every delivered notification from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DeliveredNotification> {
        self.shared.sender.subscribe()
    }

    /// Number of live timer tasks.
    pub fn pending_count(&self) -> usize {
        self.shared.tasks.lock().len()
    }

    fn spawn_timer(
        &self,
        identifier: String,
        content: NotificationContent,
        trigger: NotificationTrigger,
        generation: u64,
    ) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let start = Instant::now() + Duration::from_secs(trigger.delay_secs);
            tokio::time::sleep_until(start).await;
            shared.deliver(&identifier, &content, &trigger.channel_id, 0);

            let Some(every) = trigger.repeat_every_secs else {
                shared.finish(&identifier, generation);
                return;
            };
            let period = Duration::from_secs(every.max(1));
            let mut ticker = tokio::time::interval_at(start + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut sequence = 0;
            loop {
                ticker.tick().await;
                sequence += 1;
                shared.deliver(&identifier, &content, &trigger.channel_id, sequence);
            }
        })
    }
}

impl Default for LocalNotificationPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LocalNotificationPlatform {
    fn drop(&mut self) {
        for (_, task) in self.shared.tasks.lock().drain() {
            task.handle.abort();
        }
    }
}

#[async_trait]
impl NotificationPlatform for LocalNotificationPlatform {
    async fn schedule(
        &self,
        content: NotificationContent,
        trigger: NotificationTrigger,
        identifier: &str,
    ) -> Result<String, SchedulerError> {
        if *self.permission.lock() == PermissionStatus::Denied {
            return Err(SchedulerError::PermissionDenied);
        }
        if !self
            .channels
            .lock()
            .iter()
            .any(|channel| channel.id == trigger.channel_id)
        {
            warn!(
                "scheduling on unregistered channel (identifier={}, channel={})",
                identifier, trigger.channel_id
            );
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let first_fire_at = self
            .shared
            .clock
            .now_ms()
            .saturating_add((trigger.delay_secs as i64).saturating_mul(1000));
        let notification = ScheduledNotification {
            identifier: identifier.to_string(),
            content: content.clone(),
            trigger: trigger.clone(),
            first_fire_at,
        };
        // Held across spawn so a one-shot task cannot finish before it is registered.
        let mut tasks = self.shared.tasks.lock();
        let handle = self.spawn_timer(identifier.to_string(), content, trigger, generation);
        let replaced = tasks.insert(
            identifier.to_string(),
            ScheduledTask {
                notification,
                generation,
                handle,
            },
        );
        drop(tasks);
        if let Some(previous) = replaced {
            previous.handle.abort();
        }
        debug!(
            "scheduled local notification (identifier={}, first_fire_at={})",
            identifier, first_fire_at
        );
        Ok(identifier.to_string())
    }

    async fn cancel(&self, identifier: &str) -> Result<(), SchedulerError> {
        if let Some(task) = self.shared.tasks.lock().remove(identifier) {
            task.handle.abort();
            debug!("cancelled local notification (identifier={identifier})");
        }
        Ok(())
    }

    async fn permission_status(&self) -> Result<PermissionStatus, SchedulerError> {
        Ok(*self.permission.lock())
    }

    async fn request_permissions(&self) -> Result<PermissionStatus, SchedulerError> {
        let mut permission = self.permission.lock();
        if *permission != PermissionStatus::Granted {
            *permission = self.grant;
        }
        info!("notification permission (status={})", permission.as_str());
        Ok(*permission)
    }

    async fn ensure_channel(&self, channel: &ChannelConfig) -> Result<(), SchedulerError> {
        let mut channels = self.channels.lock();
        match channels.iter_mut().find(|existing| existing.id == channel.id) {
            Some(existing) => *existing = channel.clone(),
            None => channels.push(channel.clone()),
        }
        debug!("registered notification channel (id={})", channel.id);
        Ok(())
    }

    fn set_presentation(&self, presentation: PresentationConfig) {
        *self.shared.presentation.lock() = presentation;
    }

    async fn channels(&self) -> Result<Vec<ChannelConfig>, SchedulerError> {
        Ok(self.channels.lock().clone())
    }

    async fn scheduled(&self) -> Result<Vec<ScheduledNotification>, SchedulerError> {
        let mut scheduled: Vec<_> = self
            .shared
            .tasks
            .lock()
            .values()
            .map(|task| task.notification.clone())
            .collect();
        scheduled.sort_by(|a, b| {
            a.first_fire_at
                .cmp(&b.first_fire_at)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        Ok(scheduled)
    }
}

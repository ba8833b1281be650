use async_trait::async_trait;
use nudge_rs_config::{ChannelConfig, PresentationConfig};
use nudge_rs_core::{
    NotificationContent, NotificationPlatform, NotificationTrigger, PermissionStatus,
    SchedulerError,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// A call observed by [`RecordingPlatform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    Schedule {
        identifier: String,
        content: NotificationContent,
        trigger: NotificationTrigger,
    },
    Cancel(String),
    RequestPermissions,
    EnsureChannel(String),
    SetPresentation(PresentationConfig),
}

/// Platform that records every call and can be told to fail.
#[derive(Debug)]
pub struct RecordingPlatform {
    calls: Mutex<Vec<PlatformCall>>,
    permission: Mutex<PermissionStatus>,
    grant: PermissionStatus,
    fail_schedule: AtomicBool,
    fail_cancel: AtomicBool,
}

impl Default for RecordingPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            permission: Mutex::new(PermissionStatus::Undetermined),
            grant: PermissionStatus::Granted,
            fail_schedule: AtomicBool::new(false),
            fail_cancel: AtomicBool::new(false),
        }
    }

    /// Answer permission requests with `status`.
    pub fn denying(status: PermissionStatus) -> Self {
        Self {
            grant: status,
            ..Self::new()
        }
    }

    pub fn set_fail_schedule(&self, fail: bool) {
        self.fail_schedule.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_cancel(&self, fail: bool) {
        self.fail_cancel.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().clone()
    }

    /// Identifiers passed to `cancel`, in order.
    pub fn cancelled(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                PlatformCall::Cancel(identifier) => Some(identifier.clone()),
                _ => None,
            })
            .collect()
    }

    /// `(identifier, trigger)` for every `schedule` call, in order.
    pub fn scheduled_triggers(&self) -> Vec<(String, NotificationTrigger)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                PlatformCall::Schedule {
                    identifier,
                    trigger,
                    ..
                } => Some((identifier.clone(), trigger.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl NotificationPlatform for RecordingPlatform {
    async fn schedule(
        &self,
        content: NotificationContent,
        trigger: NotificationTrigger,
        identifier: &str,
    ) -> Result<String, SchedulerError> {
        self.calls.lock().push(PlatformCall::Schedule {
            identifier: identifier.to_string(),
            content,
            trigger,
        });
        if self.fail_schedule.load(Ordering::SeqCst) {
            return Err(SchedulerError::Platform("schedule disabled".to_string()));
        }
        Ok(identifier.to_string())
    }

    async fn cancel(&self, identifier: &str) -> Result<(), SchedulerError> {
        self.calls
            .lock()
            .push(PlatformCall::Cancel(identifier.to_string()));
        if self.fail_cancel.load(Ordering::SeqCst) {
            return Err(SchedulerError::Platform("cancel disabled".to_string()));
        }
        Ok(())
    }

    async fn permission_status(&self) -> Result<PermissionStatus, SchedulerError> {
        Ok(*self.permission.lock())
    }

    async fn request_permissions(&self) -> Result<PermissionStatus, SchedulerError> {
        self.calls.lock().push(PlatformCall::RequestPermissions);
        let mut permission = self.permission.lock();
        *permission = self.grant;
        Ok(*permission)
    }

    async fn ensure_channel(&self, channel: &ChannelConfig) -> Result<(), SchedulerError> {
        self.calls
            .lock()
            .push(PlatformCall::EnsureChannel(channel.id.clone()));
        Ok(())
    }

    fn set_presentation(&self, presentation: PresentationConfig) {
        self.calls
            .lock()
            .push(PlatformCall::SetPresentation(presentation));
    }
}

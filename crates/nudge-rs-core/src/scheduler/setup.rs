//! One-time notification setup run at startup.

use super::{NotificationPlatform, PermissionStatus};
use crate::error::SchedulerError;
use log::{info, warn};
use nudge_rs_config::NotificationsConfig;

/// Outcome of [`initialize_notifications`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupReport {
    pub permission: PermissionStatus,
    pub channel_id: String,
}

/// Configure presentation, obtain permission and register the channel.
///
/// A refused permission is reported, not returned as an error; reminders can
/// still be managed, they just will not be delivered.
pub async fn initialize_notifications(
    platform: &dyn NotificationPlatform,
    config: &NotificationsConfig,
) -> Result<SetupReport, SchedulerError> {
    platform.set_presentation(config.presentation);

    let mut permission = platform.permission_status().await?;
    if !permission.is_granted() {
        permission = platform.request_permissions().await?;
    }
    if !permission.is_granted() {
        warn!(
            "notification permission not granted (status={})",
            permission.as_str()
        );
    }

    platform.ensure_channel(&config.channel).await?;
    info!(
        "notifications initialized (permission={}, channel={})",
        permission.as_str(),
        config.channel.id
    );
    Ok(SetupReport {
        permission,
        channel_id: config.channel.id.clone(),
    })
}

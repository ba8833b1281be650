//! Persisted reminder record.

use crate::interval::{interval_to_millis, next_trigger};
use serde::{Deserialize, Deserializer, Serialize};

/// A recurring reminder as stored under the reminders key.
///
/// Field names are camelCase on disk so existing collections keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    /// Unique among stored reminders; doubles as the notification identifier.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Interval selector in hours, kept as text (`"0.00833"`, `"6"`).
    pub interval: String,
    /// Creation time in epoch milliseconds; anchors the firing schedule.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: i64,
    /// Handle returned by the scheduler; absent when scheduling never completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<String>,
}

impl Reminder {
    /// Repeat duration in milliseconds, or `None` when the interval is not numeric.
    pub fn interval_ms(&self) -> Option<u64> {
        self.interval
            .trim()
            .parse::<f64>()
            .ok()
            .map(interval_to_millis)
    }

    /// Next firing time after `now`, or `None` when the interval is not numeric.
    pub fn next_trigger(&self, now: i64) -> Option<i64> {
        self.interval_ms()
            .map(|interval_ms| next_trigger(self.created_at, interval_ms, now))
    }
}

/// Accept epoch milliseconds written either as a number or a numeric string.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Timestamp {
        Millis(i64),
        Text(String),
    }

    match Timestamp::deserialize(deserializer)? {
        Timestamp::Millis(ms) => Ok(ms),
        Timestamp::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

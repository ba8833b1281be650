//! Interval arithmetic for recurring reminders.
//!
//! Converts the interval selector stored on a reminder into milliseconds and
//! finds the next firing time aligned to the reminder's creation timestamp.

use crate::types::Reminder;
use chrono::Utc;
use nudge_rs_config::IntervalsConfig;
use std::fmt;

/// Repeat cadence used for any interval value below one hour.
pub const TESTING_INTERVAL_MS: u64 = 30_000;
/// Stored value of the testing interval choice.
pub const TESTING_INTERVAL_VALUE: &str = "0.00833";
const MILLIS_PER_HOUR: u64 = 3_600_000;

/// Map an interval selector (hours) to a repeat duration in milliseconds.
///
/// Values below 1, including negative and non-finite input, select the
/// fixed testing interval.
pub fn interval_to_millis(interval: f64) -> u64 {
    if interval.is_finite() && interval >= 1.0 {
        (interval * MILLIS_PER_HOUR as f64) as u64
    } else {
        TESTING_INTERVAL_MS
    }
}

/// Smallest timestamp strictly after `now` on `created_at + k * interval_ms`.
///
/// A zero interval is treated as one millisecond.
pub fn next_trigger(created_at: i64, interval_ms: u64, now: i64) -> i64 {
    let interval = i64::try_from(interval_ms.max(1)).unwrap_or(i64::MAX);
    let elapsed = now.saturating_sub(created_at);
    let completed = elapsed.div_euclid(interval);
    created_at.saturating_add(completed.saturating_add(1).saturating_mul(interval))
}

/// [`next_trigger`] evaluated against the system clock.
pub fn next_trigger_from_now(created_at: i64, interval_ms: u64) -> i64 {
    next_trigger(created_at, interval_ms, Utc::now().timestamp_millis())
}

/// Render a repeat duration: seconds under two minutes, else whole hours.
pub fn format_duration(ms: u64) -> String {
    let seconds = ms / 1000;
    if seconds < 120 {
        format!("{seconds} second{}", plural_suffix(seconds))
    } else {
        let hours = seconds / 3600;
        format!("{hours} hour{}", plural_suffix(hours))
    }
}

/// Render the time left until the next firing.
pub fn format_countdown(diff_ms: i64) -> String {
    if diff_ms <= 0 {
        return "triggering now".to_string();
    }
    let hours = diff_ms / 3_600_000;
    let minutes = (diff_ms % 3_600_000) / 60_000;
    let seconds = (diff_ms % 60_000) / 1000;

    if hours > 0 {
        format!("in {hours}h {minutes}m")
    } else if minutes > 0 {
        format!("in {minutes}m {seconds}s")
    } else {
        format!("in {seconds}s")
    }
}

/// Countdown text for a reminder at `now`.
pub fn countdown_label(reminder: &Reminder, now: i64) -> String {
    match reminder.interval_ms() {
        Some(interval_ms) => {
            let next = next_trigger(reminder.created_at, interval_ms, now);
            format_countdown(next - now)
        }
        None => "calculating...".to_string(),
    }
}

fn plural_suffix(count: u64) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// One entry of the fixed interval picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalChoice {
    /// Thirty-second cadence for manual verification.
    Testing,
    /// Repeat every N hours.
    Hours(u32),
}

impl IntervalChoice {
    /// Choices offered by the picker, testing first when enabled.
    pub fn choices(config: &IntervalsConfig) -> Vec<Self> {
        let mut choices = Vec::with_capacity(config.hours.len() + 1);
        if config.include_testing {
            choices.push(Self::Testing);
        }
        choices.extend(config.hours.iter().copied().map(Self::Hours));
        choices
    }

    /// Parse a stored interval string.
    ///
    /// Anything below one hour maps to [`IntervalChoice::Testing`]; other
    /// values must be whole hours.
    pub fn parse(value: &str) -> Option<Self> {
        let hours: f64 = value.trim().parse().ok()?;
        if !(hours.is_finite() && hours >= 1.0) {
            return Some(Self::Testing);
        }
        if hours.fract() != 0.0 || hours > f64::from(u32::MAX) {
            return None;
        }
        Some(Self::Hours(hours as u32))
    }

    /// Value persisted in the reminder's `interval` field.
    pub fn value(&self) -> String {
        match self {
            Self::Testing => TESTING_INTERVAL_VALUE.to_string(),
            Self::Hours(hours) => hours.to_string(),
        }
    }

    /// Picker label.
    pub fn label(&self) -> String {
        match self {
            Self::Testing => "Every 30 seconds (Testing)".to_string(),
            Self::Hours(1) => "Every hour".to_string(),
            Self::Hours(hours) => format!("Every {hours} hours"),
        }
    }

    /// Repeat duration in milliseconds.
    pub fn millis(&self) -> u64 {
        match self {
            Self::Testing => TESTING_INTERVAL_MS,
            Self::Hours(hours) => u64::from(*hours) * MILLIS_PER_HOUR,
        }
    }
}

impl fmt::Display for IntervalChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

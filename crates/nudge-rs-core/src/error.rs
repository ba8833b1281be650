//! Error types for the reminder core crate.

use thiserror::Error;

/// Errors returned by key-value and reminder storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Backend refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by the notification platform and the scheduler adapter.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The user has not granted notification permissions.
    #[error("notification permission not granted")]
    PermissionDenied,
    /// The reminder cannot be turned into a trigger.
    #[error("invalid trigger: {0}")]
    InvalidTrigger(String),
    /// The platform rejected or failed the request.
    #[error("platform error: {0}")]
    Platform(String),
}

/// Errors surfaced by the create/delete reminder flows.
#[derive(Debug, Error)]
pub enum ReminderError {
    /// Required input is missing or malformed; raised before any IO.
    #[error("validation error: {0}")]
    Validation(String),
    /// Scheduling the notification failed; nothing was stored.
    #[error("scheduling error: {0}")]
    Scheduling(#[from] SchedulerError),
    /// Persisting the reminder collection failed.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

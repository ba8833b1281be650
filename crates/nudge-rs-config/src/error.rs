//! Errors raised while reading and checking `nudge.json5` layers.

use thiserror::Error;

/// Failure loading or validating the Nudge config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required `nudge.json5` layer could not be read.
    #[error("failed to read nudge config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// A layer is not valid JSON5.
    #[error("failed to parse nudge config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// The merged layers do not decode into [`crate::NudgeConfig`].
    #[error("failed to decode nudge config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// A key in one layer has the wrong shape; `path` is `<layer>:<dotted.key>`.
    #[error("invalid nudge config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// The merged config breaks a cross-field rule, e.g. an empty storage key.
    #[error("invalid nudge config: {0}")]
    Invalid(String),
}

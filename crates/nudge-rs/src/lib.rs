//! Public SDK surface for Nudge.
//!
//! This crate re-exports the reminder building blocks and provides a small
//! initialization helper to keep consumer setup consistent.

/// Re-export for convenience.
pub use nudge_rs_config as config;
pub use nudge_rs_core as core;
/// Terminal UI entry point.
pub use nudge_rs_tui::{TuiConfig, run};

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::builder()
            .format_timestamp_millis()
            .parse_default_env()
            .try_init();
    }
    log::debug!("nudge logging initialized");
}

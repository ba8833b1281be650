//! Terminal client for managing recurring reminders.

use anyhow::Context;
use clap::Parser;
use directories::UserDirs;
use log::{debug, info, warn};
use nudge_rs_config::{LayeredConfigOptions, NudgeConfig};
use nudge_rs_core::{
    Clock, FileKeyValueStore, IntervalChoice, LocalNotificationPlatform, NotificationPlatform,
    ReminderService, ReminderStore, SchedulerAdapter, SystemClock, initialize_notifications,
};
use nudge_rs_tui::TuiConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Command-line options for the Nudge TUI.
#[derive(Parser)]
#[command(name = "nudge", version)]
struct Cli {
    /// Extra nudge.json5 config file, highest precedence (repeatable)
    #[arg(long)]
    config: Vec<PathBuf>,
    /// Directory for stored reminders
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

/// Entry point for the Nudge TUI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();

    let cli = Cli::parse();
    info!(
        "starting nudge (config_paths={}, data_dir_set={})",
        cli.config.len(),
        cli.data_dir.is_some()
    );

    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    let mut options = LayeredConfigOptions::new(&cwd);
    for path in &cli.config {
        options = options.with_runtime_path(path);
    }
    let layered =
        NudgeConfig::load_layered_with_options(options).context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    let config = layered.config;

    let data_dir = resolve_data_dir(cli.data_dir, &config)?;
    info!("using data dir: {}", data_dir.display());
    let kv = Arc::new(
        FileKeyValueStore::new(&data_dir).context("failed to create reminder storage")?,
    );
    let store = ReminderStore::from_config(kv, &config.storage);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let local = Arc::new(LocalNotificationPlatform::with_clock(clock.clone()));
    let deliveries = local.subscribe();
    let platform: Arc<dyn NotificationPlatform> = local;

    match initialize_notifications(platform.as_ref(), &config.notifications).await {
        Ok(report) => debug!(
            "notification setup done (permission={}, channel={})",
            report.permission.as_str(),
            report.channel_id
        ),
        Err(err) => warn!("notification setup failed: {err}"),
    }

    let scheduler = SchedulerAdapter::new(platform, clock.clone(), &config.notifications);
    let service = ReminderService::new(store, scheduler, clock);
    let restored = service.restore().await;
    debug!("reminder notifications re-armed (count={restored})");
    let tui_config = TuiConfig {
        tick: Duration::from_millis(config.ui.tick_ms),
        choices: IntervalChoice::choices(&config.intervals),
    };

    nudge_rs_tui::run(service, Some(deliveries), tui_config).await
}

/// Pick the storage directory: CLI flag, then config, then `~/.nudge/data`.
fn resolve_data_dir(cli: Option<PathBuf>, config: &NudgeConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = cli {
        return Ok(path);
    }
    if let Some(path) = config.storage.path.as_ref() {
        return Ok(PathBuf::from(path));
    }
    UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".nudge").join("data"))
        .context("failed to resolve home directory")
}

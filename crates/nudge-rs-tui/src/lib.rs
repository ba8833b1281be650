//! Library entry point for the Nudge TUI.
//!
//! Provides a reusable [`run`] function that launches the Ratatui terminal UI
//! against a pre-configured [`ReminderService`].

mod app;
mod event;
mod ui;

use anyhow::anyhow;
use app::{App, Diagnostics, FormField, Screen};
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use event::AppEvent;
use log::{debug, info, warn};
use nudge_rs_core::{DeliveredNotification, IntervalChoice, ReminderError, ReminderService};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Configuration for a TUI session.
#[derive(Debug, Clone)]
pub struct TuiConfig {
    /// Countdown refresh period.
    pub tick: Duration,
    /// Interval picker entries, first is the default.
    pub choices: Vec<IntervalChoice>,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(1000),
            choices: IntervalChoice::choices(&Default::default()),
        }
    }
}

/// Launch the Nudge TUI.
///
/// The caller is responsible for:
/// - Running notification setup before calling `run`
/// - Initializing logging (e.g. `env_logger`) before calling `run`
///
/// `deliveries`, when given, feeds fired notifications into the UI.
///
/// # Errors
/// Returns an error if terminal setup or the event loop fails.
pub async fn run(
    service: ReminderService,
    deliveries: Option<broadcast::Receiver<DeliveredNotification>>,
    config: TuiConfig,
) -> anyhow::Result<()> {
    if config.choices.is_empty() {
        return Err(anyhow!("no interval choices configured"));
    }
    if config.tick.is_zero() {
        return Err(anyhow!("tick period must be greater than zero"));
    }
    let mut app = App::new(config.choices.clone(), service.now_ms());
    app.set_reminders(service.list().await);
    info!("starting tui (reminders={})", app.reminders.len());

    let mut terminal = setup_terminal()?;
    let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let mut tasks = vec![
        spawn_input_handler(tx.clone()),
        spawn_tick(tx.clone(), config.tick),
    ];
    if let Some(deliveries) = deliveries {
        tasks.push(spawn_delivery_forwarder(deliveries, tx.clone()));
    }

    let result = event_loop(&mut terminal, &service, &mut app, &mut rx).await;

    for task in tasks {
        task.abort();
    }
    restore_terminal(&mut terminal)?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    service: &ReminderService,
    app: &mut App,
    rx: &mut mpsc::Receiver<AppEvent>,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;
        let event = rx
            .recv()
            .await
            .ok_or_else(|| anyhow!("event channel closed unexpectedly"))?;
        if handle_app_event(event, service, app).await? {
            return Ok(());
        }
    }
}

/// Dispatch a UI event and return true when the app should exit.
async fn handle_app_event(
    event: AppEvent,
    service: &ReminderService,
    app: &mut App,
) -> anyhow::Result<bool> {
    match event {
        AppEvent::Input(key) => handle_input(key, service, app).await,
        AppEvent::Tick => {
            app.tick(service.now_ms());
            Ok(false)
        }
        AppEvent::Delivered(delivered) => {
            debug!(
                "notification delivered (identifier={}, sequence={})",
                delivered.identifier, delivered.sequence
            );
            app.record_delivery(&delivered);
            Ok(false)
        }
        AppEvent::DeliveriesMissed(count) => {
            app.push_status(format!("missed {count} notifications"));
            Ok(false)
        }
    }
}

/// Handle keyboard input and dispatch actions.
async fn handle_input(
    key: KeyEvent,
    service: &ReminderService,
    app: &mut App,
) -> anyhow::Result<bool> {
    if key.kind == KeyEventKind::Release {
        return Ok(false);
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Ok(true);
    }
    if app.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.dismiss_alert();
        }
        return Ok(false);
    }

    match app.screen {
        Screen::List => handle_list_input(key, service, app).await,
        Screen::Create => {
            handle_create_input(key, service, app).await;
            Ok(false)
        }
        Screen::Diagnostics => {
            handle_diagnostics_input(key, service, app).await;
            Ok(false)
        }
    }
}

/// Handle keyboard input on the reminder list.
async fn handle_list_input(
    key: KeyEvent,
    service: &ReminderService,
    app: &mut App,
) -> anyhow::Result<bool> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Char('n') => app.open_create(),
        KeyCode::Char('d') | KeyCode::Delete => delete_selected(service, app).await,
        KeyCode::Char('r') => {
            app.set_reminders(service.list().await);
            app.push_status("reloaded");
        }
        KeyCode::Char('t') => {
            let diagnostics = load_diagnostics(service).await;
            app.open_diagnostics(diagnostics);
        }
        _ => {}
    }
    Ok(false)
}

/// Handle keyboard input on the creation form.
async fn handle_create_input(key: KeyEvent, service: &ReminderService, app: &mut App) {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.open_list(),
        KeyCode::Tab => app.focus_next(),
        KeyCode::BackTab => app.focus_prev(),
        KeyCode::Enter => submit_form(service, app).await,
        KeyCode::Char('j') if control => app.insert_newline(),
        KeyCode::Left if app.form.focus == FormField::Interval => app.prev_choice(),
        KeyCode::Right if app.form.focus == FormField::Interval => app.next_choice(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Char(ch) if !control => app.insert_char(ch),
        _ => {}
    }
}

/// Handle keyboard input on the diagnostics screen.
async fn handle_diagnostics_input(key: KeyEvent, service: &ReminderService, app: &mut App) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.open_list(),
        KeyCode::Char('p') => {
            let platform = service.scheduler().platform();
            match platform.request_permissions().await {
                Ok(status) => app.push_status(format!("permission {}", status.as_str())),
                Err(err) => {
                    warn!("permission request failed: {err}");
                    app.show_alert("Error", format!("Permission request failed: {err}"));
                }
            }
            app.diagnostics = load_diagnostics(service).await;
        }
        KeyCode::Char('s') => {
            match service.scheduler().send_test_notification().await {
                Ok(_) => app.push_status("test notification in 2s"),
                Err(err) => {
                    warn!("test notification failed: {err}");
                    app.show_alert("Error", format!("Test notification failed: {err}"));
                }
            }
            app.diagnostics = load_diagnostics(service).await;
        }
        KeyCode::Char('x') => {
            match service.clear_all().await {
                Ok(()) => app.show_alert("Success", "All reminders cleared."),
                Err(err) => {
                    warn!("clear failed: {err}");
                    app.show_alert("Error", "Failed to clear reminders.");
                }
            }
            app.set_reminders(service.list().await);
            app.diagnostics = load_diagnostics(service).await;
        }
        KeyCode::Char('r') => app.diagnostics = load_diagnostics(service).await,
        _ => {}
    }
}

/// Create a reminder from the form and return to the list on success.
async fn submit_form(service: &ReminderService, app: &mut App) {
    match service.create(app.draft()).await {
        Ok(reminder) => {
            info!("reminder created from form (id={})", reminder.id);
            app.set_reminders(service.list().await);
            app.selected = app.reminders.len().saturating_sub(1);
            app.open_list();
            app.show_alert("Success", "Reminder created successfully!");
        }
        Err(ReminderError::Validation(message)) => app.show_alert("Error", message),
        Err(err) => {
            warn!("failed to save reminder: {err}");
            app.show_alert("Error", "Failed to save reminder.");
        }
    }
}

/// Delete the selected reminder and adopt the store's updated list.
async fn delete_selected(service: &ReminderService, app: &mut App) {
    let Some(id) = app.selected_reminder().map(|reminder| reminder.id.clone()) else {
        return;
    };
    match service.delete(&id).await {
        Ok(updated) => {
            app.set_reminders(updated);
            app.show_alert("Success", "Reminder deleted successfully!");
        }
        Err(err) => {
            warn!("failed to delete reminder (id={id}): {err}");
            app.set_reminders(service.list().await);
            app.show_alert("Error", "Failed to delete reminder.");
        }
    }
}

/// Collect permission, channel, schedule and storage details.
async fn load_diagnostics(service: &ReminderService) -> Diagnostics {
    let platform = service.scheduler().platform();
    let permission = match platform.permission_status().await {
        Ok(status) => Some(status),
        Err(err) => {
            warn!("failed to read permission status: {err}");
            None
        }
    };
    let channels = platform.channels().await.unwrap_or_else(|err| {
        warn!("failed to list channels: {err}");
        Vec::new()
    });
    let scheduled = platform.scheduled().await.unwrap_or_else(|err| {
        warn!("failed to list scheduled notifications: {err}");
        Vec::new()
    });
    Diagnostics {
        permission,
        channels,
        scheduled,
        store_key: service.store().key().to_string(),
        store_path: service
            .store()
            .location()
            .map(|path| path.display().to_string()),
    }
}

/// Spawn a task to poll for input events.
fn spawn_input_handler(sender: mpsc::Sender<AppEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if matches!(crossterm::event::poll(Duration::from_millis(30)), Ok(true)) {
                while matches!(crossterm::event::poll(Duration::from_millis(0)), Ok(true)) {
                    let event = match crossterm::event::read() {
                        Ok(event) => event,
                        Err(_) => break,
                    };
                    if let CrosstermEvent::Key(key) = event
                        && sender.send(AppEvent::Input(key)).await.is_err()
                    {
                        return;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

/// Spawn the periodic countdown tick.
fn spawn_tick(sender: mpsc::Sender<AppEvent>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if sender.send(AppEvent::Tick).await.is_err() {
                return;
            }
        }
    })
}

/// Forward platform deliveries into the UI event channel.
fn spawn_delivery_forwarder(
    mut deliveries: broadcast::Receiver<DeliveredNotification>,
    sender: mpsc::Sender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = match deliveries.recv().await {
                Ok(delivered) => AppEvent::Delivered(delivered),
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!("delivery stream lagged (missed={count})");
                    AppEvent::DeliveriesMissed(count)
                }
                Err(broadcast::error::RecvError::Closed) => return,
            };
            if sender.send(event).await.is_err() {
                return;
            }
        }
    })
}

/// Configure terminal in raw mode with alternate screen.
fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    debug!("setting up terminal");
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal state on exit.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    debug!("restoring terminal");
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};
    use nudge_rs_config::NudgeConfig;
    use nudge_rs_core::{ReminderStore, SchedulerAdapter};
    use nudge_rs_test_utils::{FixedClock, MemoryKeyValueStore, RecordingPlatform};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char(ch))
        }
    }

    fn service() -> (ReminderService, Arc<RecordingPlatform>, Arc<MemoryKeyValueStore>) {
        let config = NudgeConfig::default();
        let platform = Arc::new(RecordingPlatform::new());
        let kv = Arc::new(MemoryKeyValueStore::new());
        let clock = Arc::new(FixedClock::new(1_000));
        let store = ReminderStore::from_config(kv.clone(), &config.storage);
        let scheduler =
            SchedulerAdapter::new(platform.clone(), clock.clone(), &config.notifications);
        (ReminderService::new(store, scheduler, clock), platform, kv)
    }

    async fn send(service: &ReminderService, app: &mut App, keys: &[KeyEvent]) -> bool {
        let mut exit = false;
        for key in keys {
            exit = handle_app_event(AppEvent::Input(*key), service, app)
                .await
                .expect("event");
        }
        exit
    }

    async fn type_text(service: &ReminderService, app: &mut App, text: &str) {
        for ch in text.chars() {
            send(service, app, &[key(KeyCode::Char(ch))]).await;
        }
    }

    fn app() -> App {
        App::new(TuiConfig::default().choices, 1_000)
    }

    #[tokio::test]
    async fn create_flow_returns_to_list_with_success_alert() {
        let (service, platform, _) = service();
        let mut app = app();

        send(&service, &mut app, &[key(KeyCode::Char('n'))]).await;
        assert_eq!(app.screen, Screen::Create);
        type_text(&service, &mut app, "Water").await;
        send(&service, &mut app, &[key(KeyCode::Tab)]).await;
        type_text(&service, &mut app, "Drink").await;
        send(
            &service,
            &mut app,
            &[ctrl('j'), key(KeyCode::Tab), key(KeyCode::Right)],
        )
        .await;
        type_text(&service, &mut app, "up").await;
        send(&service, &mut app, &[key(KeyCode::Enter)]).await;

        assert_eq!(app.screen, Screen::List);
        assert_eq!(app.reminders.len(), 1);
        assert_eq!(app.reminders[0].title, "Water");
        assert_eq!(app.reminders[0].interval, "1");
        assert_eq!(
            app.alert.as_ref().map(|alert| alert.message.as_str()),
            Some("Reminder created successfully!")
        );
        assert_eq!(platform.scheduled_triggers().len(), 1);
    }

    #[tokio::test]
    async fn empty_form_shows_validation_alert() {
        let (service, platform, _) = service();
        let mut app = app();
        send(
            &service,
            &mut app,
            &[key(KeyCode::Char('n')), key(KeyCode::Enter)],
        )
        .await;

        assert_eq!(app.screen, Screen::Create);
        assert_eq!(
            app.alert.as_ref().map(|alert| alert.message.as_str()),
            Some("Please enter both title and description.")
        );
        assert!(platform.calls().is_empty());

        send(&service, &mut app, &[key(KeyCode::Esc)]).await;
        assert!(app.alert.is_none());
        assert_eq!(app.screen, Screen::Create);
    }

    #[tokio::test]
    async fn storage_failure_shows_generic_alert() {
        let (service, _, kv) = service();
        kv.set_fail_writes(true);
        let mut app = app();
        app.open_create();
        type_text(&service, &mut app, "a").await;
        send(&service, &mut app, &[key(KeyCode::Tab)]).await;
        type_text(&service, &mut app, "b").await;
        send(&service, &mut app, &[key(KeyCode::Enter)]).await;

        assert_eq!(
            app.alert.as_ref().map(|alert| alert.message.as_str()),
            Some("Failed to save reminder.")
        );
        assert!(app.reminders.is_empty());
    }

    #[tokio::test]
    async fn delete_removes_selected_reminder() {
        let (service, platform, _) = service();
        let created = service
            .create(nudge_rs_core::ReminderDraft::new("a", "b", "2"))
            .await
            .expect("create");
        let mut app = app();
        app.set_reminders(service.list().await);
        platform.clear_calls();

        send(&service, &mut app, &[key(KeyCode::Char('d'))]).await;
        assert!(app.reminders.is_empty());
        assert_eq!(platform.cancelled(), vec![created.id]);
        assert_eq!(
            app.alert.as_ref().map(|alert| alert.message.as_str()),
            Some("Reminder deleted successfully!")
        );
    }

    #[tokio::test]
    async fn quit_keys_exit_from_list_only() {
        let (service, _, _) = service();
        let mut app = app();
        app.open_create();
        assert!(!send(&service, &mut app, &[key(KeyCode::Char('q'))]).await);
        assert!(send(&service, &mut app, &[ctrl('c')]).await);

        app.open_list();
        assert!(send(&service, &mut app, &[key(KeyCode::Char('q'))]).await);
    }

    #[tokio::test]
    async fn diagnostics_lists_store_and_sends_test() {
        let (service, platform, _) = service();
        let mut app = app();
        send(&service, &mut app, &[key(KeyCode::Char('t'))]).await;
        assert_eq!(app.screen, Screen::Diagnostics);
        assert_eq!(app.diagnostics.store_key, "@notifications");

        send(&service, &mut app, &[key(KeyCode::Char('s'))]).await;
        let triggers = platform.scheduled_triggers();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].1.delay_secs, 2);
        assert_eq!(triggers[0].1.repeat_every_secs, None);

        send(&service, &mut app, &[key(KeyCode::Esc)]).await;
        assert_eq!(app.screen, Screen::List);
    }

    #[tokio::test]
    async fn tick_updates_clock() {
        let (service, _, _) = service();
        let mut app = App::new(TuiConfig::default().choices, 0);
        handle_app_event(AppEvent::Tick, &service, &mut app)
            .await
            .expect("tick");
        assert_eq!(app.now_ms, 1_000);
    }
}

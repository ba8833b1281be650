//! Application state for the Nudge TUI.

use log::debug;
use nudge_rs_config::ChannelConfig;
use nudge_rs_core::{
    DeliveredNotification, IntervalChoice, PermissionStatus, Reminder, ReminderDraft,
    ScheduledNotification,
};

/// Ticks a delivered-notification toast stays on screen.
const TOAST_TICKS: u8 = 5;

/// Screen currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Stored reminders with live countdowns.
    List,
    /// New reminder form.
    Create,
    /// Permission, channel and scheduler state.
    Diagnostics,
}

/// Focused field on the creation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Interval,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            Self::Title => Self::Description,
            Self::Description => Self::Interval,
            Self::Interval => Self::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Title => Self::Interval,
            Self::Description => Self::Title,
            Self::Interval => Self::Description,
        }
    }
}

/// Input buffers for the creation form.
#[derive(Debug, Clone)]
pub struct CreateForm {
    pub title: String,
    pub description: String,
    /// Index into [`App::choices`].
    pub interval_index: usize,
    pub focus: FormField,
}

impl Default for CreateForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            interval_index: 0,
            focus: FormField::Title,
        }
    }
}

/// Blocking message box dismissed with Enter or Esc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

/// Most recent delivered notification.
#[derive(Debug, Clone)]
pub struct Toast {
    pub title: String,
    pub body: String,
    ticks_left: u8,
}

/// Snapshot rendered by the diagnostics screen.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub permission: Option<PermissionStatus>,
    pub channels: Vec<ChannelConfig>,
    pub scheduled: Vec<ScheduledNotification>,
    pub store_key: String,
    pub store_path: Option<String>,
}

/// Top-level application state for the TUI.
pub struct App {
    pub screen: Screen,
    pub reminders: Vec<Reminder>,
    /// Index of the selected reminder in the list.
    pub selected: usize,
    pub form: CreateForm,
    /// Interval picker entries.
    pub choices: Vec<IntervalChoice>,
    pub alert: Option<Alert>,
    pub toast: Option<Toast>,
    pub delivered_count: u64,
    pub diagnostics: Diagnostics,
    /// Status line text.
    pub status: String,
    /// Time used for countdowns, refreshed on every tick.
    pub now_ms: i64,
}

impl App {
    pub fn new(choices: Vec<IntervalChoice>, now_ms: i64) -> Self {
        Self {
            screen: Screen::List,
            reminders: Vec::new(),
            selected: 0,
            form: CreateForm::default(),
            choices,
            alert: None,
            toast: None,
            delivered_count: 0,
            diagnostics: Diagnostics::default(),
            status: "idle".to_string(),
            now_ms,
        }
    }

    /// Replace the list with the store's view, keeping the selection in range.
    pub fn set_reminders(&mut self, reminders: Vec<Reminder>) {
        debug!("reminders updated (count={})", reminders.len());
        self.reminders = reminders;
        self.selected = self.selected.min(self.reminders.len().saturating_sub(1));
    }

    pub fn selected_reminder(&self) -> Option<&Reminder> {
        self.reminders.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.reminders.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn open_list(&mut self) {
        self.screen = Screen::List;
    }

    /// Open the creation form with cleared inputs.
    pub fn open_create(&mut self) {
        self.form = CreateForm::default();
        self.screen = Screen::Create;
    }

    pub fn open_diagnostics(&mut self, diagnostics: Diagnostics) {
        self.diagnostics = diagnostics;
        self.screen = Screen::Diagnostics;
    }

    pub fn show_alert(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.alert = Some(Alert {
            title: title.into(),
            message: message.into(),
        });
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn push_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Advance the clock and age out the toast.
    pub fn tick(&mut self, now_ms: i64) {
        self.now_ms = now_ms;
        if let Some(toast) = self.toast.as_mut() {
            toast.ticks_left = toast.ticks_left.saturating_sub(1);
            if toast.ticks_left == 0 {
                self.toast = None;
            }
        }
    }

    /// Count a delivery and show it when presentation allows alerts.
    pub fn record_delivery(&mut self, delivered: &DeliveredNotification) {
        self.delivered_count += 1;
        if delivered.presentation.show_alert {
            self.toast = Some(Toast {
                title: delivered.content.title.clone(),
                body: delivered.content.body.clone(),
                ticks_left: TOAST_TICKS,
            });
        }
    }

    /// Interval currently picked on the form.
    pub fn selected_choice(&self) -> Option<IntervalChoice> {
        self.choices.get(self.form.interval_index).copied()
    }

    pub fn focus_next(&mut self) {
        self.form.focus = self.form.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.form.focus = self.form.focus.prev();
    }

    pub fn next_choice(&mut self) {
        if !self.choices.is_empty() {
            self.form.interval_index = (self.form.interval_index + 1) % self.choices.len();
        }
    }

    pub fn prev_choice(&mut self) {
        if !self.choices.is_empty() {
            self.form.interval_index =
                (self.form.interval_index + self.choices.len() - 1) % self.choices.len();
        }
    }

    /// Type a character into the focused text field.
    pub fn insert_char(&mut self, ch: char) {
        match self.form.focus {
            FormField::Title => self.form.title.push(ch),
            FormField::Description => self.form.description.push(ch),
            FormField::Interval => {}
        }
    }

    /// Line break in the description; ignored elsewhere.
    pub fn insert_newline(&mut self) {
        if self.form.focus == FormField::Description {
            self.form.description.push('\n');
        }
    }

    pub fn backspace(&mut self) {
        match self.form.focus {
            FormField::Title => {
                self.form.title.pop();
            }
            FormField::Description => {
                self.form.description.pop();
            }
            FormField::Interval => {}
        }
    }

    /// Draft built from the form inputs.
    pub fn draft(&self) -> ReminderDraft {
        let interval = self
            .selected_choice()
            .map(|choice| choice.value())
            .unwrap_or_default();
        ReminderDraft::new(
            self.form.title.clone(),
            self.form.description.clone(),
            interval,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nudge_rs_config::{IntervalsConfig, NotificationPriority, PresentationConfig};
    use nudge_rs_core::NotificationContent;
    use pretty_assertions::assert_eq;

    fn app() -> App {
        App::new(IntervalChoice::choices(&IntervalsConfig::default()), 0)
    }

    fn reminder(id: &str) -> Reminder {
        Reminder {
            id: id.to_string(),
            title: id.to_string(),
            description: "d".to_string(),
            interval: "1".to_string(),
            created_at: 0,
            notification_id: None,
        }
    }

    fn delivered(show_alert: bool) -> DeliveredNotification {
        DeliveredNotification {
            identifier: "a".to_string(),
            content: NotificationContent {
                title: "Water".to_string(),
                body: "Drink".to_string(),
                priority: NotificationPriority::High,
                sound: None,
            },
            channel_id: "high-priority".to_string(),
            presentation: PresentationConfig {
                show_alert,
                ..PresentationConfig::default()
            },
            delivered_at: 0,
            sequence: 0,
        }
    }

    #[test]
    fn selection_stays_in_range_after_removal() {
        let mut app = app();
        app.set_reminders(vec![reminder("a"), reminder("b"), reminder("c")]);
        app.select_next();
        app.select_next();
        app.select_next();
        assert_eq!(app.selected, 2);

        app.set_reminders(vec![reminder("a")]);
        assert_eq!(app.selected, 0);
        app.set_reminders(Vec::new());
        assert_eq!(app.selected, 0);
        assert!(app.selected_reminder().is_none());
    }

    #[test]
    fn form_defaults_to_testing_interval() {
        let mut app = app();
        app.open_create();
        assert_eq!(app.screen, Screen::Create);
        assert_eq!(app.selected_choice(), Some(IntervalChoice::Testing));
        assert_eq!(app.draft().interval, "0.00833");
    }

    #[test]
    fn interval_picker_wraps() {
        let mut app = app();
        app.prev_choice();
        assert_eq!(app.selected_choice(), Some(IntervalChoice::Hours(24)));
        app.next_choice();
        app.next_choice();
        assert_eq!(app.selected_choice(), Some(IntervalChoice::Hours(1)));
    }

    #[test]
    fn typing_follows_focus() {
        let mut app = app();
        app.open_create();
        for ch in "Tea".chars() {
            app.insert_char(ch);
        }
        app.insert_newline();
        app.focus_next();
        app.insert_char('x');
        app.insert_newline();
        app.insert_char('y');
        app.focus_next();
        app.insert_char('z');
        app.focus_next();
        app.backspace();

        let draft = app.draft();
        assert_eq!(draft.title, "Te");
        assert_eq!(draft.description, "x\ny");
        assert_eq!(app.form.focus, FormField::Title);
        app.focus_prev();
        assert_eq!(app.form.focus, FormField::Interval);
    }

    #[test]
    fn open_create_resets_form() {
        let mut app = app();
        app.open_create();
        app.insert_char('a');
        app.next_choice();
        app.open_create();
        assert_eq!(app.form.title, "");
        assert_eq!(app.form.interval_index, 0);
    }

    #[test]
    fn toast_expires_after_ticks() {
        let mut app = app();
        app.record_delivery(&delivered(true));
        assert_eq!(app.delivered_count, 1);
        for now in 1..TOAST_TICKS as i64 {
            app.tick(now);
            assert!(app.toast.is_some());
        }
        app.tick(100);
        assert!(app.toast.is_none());
        assert_eq!(app.now_ms, 100);
    }

    #[test]
    fn hidden_alerts_are_only_counted() {
        let mut app = app();
        app.record_delivery(&delivered(false));
        assert_eq!(app.delivered_count, 1);
        assert!(app.toast.is_none());
    }

    #[test]
    fn alerts_dismiss() {
        let mut app = app();
        app.show_alert("Success", "Reminder created successfully!");
        assert_eq!(
            app.alert,
            Some(Alert {
                title: "Success".to_string(),
                message: "Reminder created successfully!".to_string(),
            })
        );
        app.dismiss_alert();
        assert!(app.alert.is_none());
    }
}

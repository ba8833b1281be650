//! TUI event types for input, ticks and notification deliveries.

use crossterm::event::KeyEvent;
use nudge_rs_core::DeliveredNotification;

/// Application event emitted by the input, tick and delivery tasks.
#[derive(Debug)]
pub enum AppEvent {
    /// Keyboard input event.
    Input(KeyEvent),
    /// Periodic countdown tick.
    Tick,
    /// A scheduled notification fired.
    Delivered(DeliveredNotification),
    /// The delivery stream dropped events because the UI fell behind.
    DeliveriesMissed(u64),
}

//! Rendering routines for the Nudge TUI.

use crate::app::{App, FormField, Screen};
use nudge_rs_core::{countdown_label, format_duration};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap,
};

const PRIMARY: Color = Color::Rgb(236, 91, 43); // #EC5B2B
const SECONDARY: Color = Color::Rgb(238, 121, 72); // #EE7948
const TEXT: Color = Color::Rgb(238, 238, 238); // #eeeeee
const TEXT_MUTED: Color = Color::Rgb(128, 128, 128); // #808080
const BORDER: Color = Color::Rgb(60, 60, 60); // #3c3c3c
const BORDER_ACTIVE: Color = Color::Rgb(238, 121, 72); // #EE7948
const YELLOW: Color = Color::Rgb(229, 192, 123); // #e5c07b
const GREEN: Color = Color::Rgb(120, 220, 140);
const RED: Color = Color::Rgb(255, 110, 110);

const HEADER_HEIGHT: u16 = 3;
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Draw the entire TUI frame.
pub fn draw(frame: &mut Frame<'_>, app: &App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT), // header bar
            Constraint::Min(0),                // screen body
            Constraint::Length(1),             // status bar
        ])
        .split(frame.area());

    draw_header(frame, app, root[0]);
    match app.screen {
        Screen::List => draw_list(frame, app, root[1]),
        Screen::Create => draw_create(frame, app, root[1]),
        Screen::Diagnostics => draw_diagnostics(frame, app, root[1]),
    }
    draw_status_bar(frame, app, root[2]);

    if app.toast.is_some() {
        draw_toast(frame, app, root[1]);
    }
    if app.alert.is_some() {
        draw_alert(frame, app, frame.area());
    }
}

fn rounded_block(title: &str, active: bool) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if active { BORDER_ACTIVE } else { BORDER }))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(if active { SECONDARY } else { TEXT_MUTED }),
        ))
}

fn draw_header(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let title = match app.screen {
        Screen::List => "Reminders",
        Screen::Create => "Create Notification",
        Screen::Diagnostics => "Diagnostics",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER));
    let line = Line::from(vec![
        Span::styled(
            " nudge",
            Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" v{VERSION}"), Style::default().fg(TEXT_MUTED)),
        Span::styled("  ·  ", Style::default().fg(BORDER)),
        Span::styled(title, Style::default().fg(TEXT)),
        Span::styled(
            format!("  ({} stored)", app.reminders.len()),
            Style::default().fg(TEXT_MUTED),
        ),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Draw reminder cards with their live countdowns.
fn draw_list(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let block = rounded_block("Reminders", true);
    if app.reminders.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No reminders yet",
                Style::default().fg(TEXT_MUTED),
            )),
            Line::from(Span::styled(
                "  Press n to create one.",
                Style::default().fg(TEXT_MUTED).add_modifier(Modifier::ITALIC),
            )),
        ])
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let label_style = Style::default().fg(TEXT_MUTED);
    let items: Vec<ListItem<'_>> = app
        .reminders
        .iter()
        .map(|reminder| {
            let mut lines = vec![Line::from(Span::styled(
                reminder.title.clone(),
                Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
            ))];
            for description_line in reminder.description.lines() {
                lines.push(Line::from(Span::styled(
                    description_line.to_string(),
                    Style::default().fg(TEXT),
                )));
            }
            let repeats = reminder
                .interval_ms()
                .map(format_duration)
                .unwrap_or_else(|| reminder.interval.clone());
            lines.push(Line::from(vec![
                Span::styled("Repeats every ", label_style),
                Span::styled(repeats, Style::default().fg(SECONDARY)),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Next trigger: ", label_style),
                Span::styled(
                    countdown_label(reminder, app.now_ms),
                    Style::default().fg(YELLOW),
                ),
            ]));
            lines.push(Line::from(""));
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Rgb(30, 30, 30)))
        .highlight_symbol("▌ ");
    let mut state = ListState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the creation form: title, description and interval picker.
fn draw_create(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(5),    // description
            Constraint::Length(3), // interval
            Constraint::Length(1), // hints
        ])
        .split(area);
    let focus = app.form.focus;
    let input_style = Style::default().fg(TEXT);

    let title_block = rounded_block("Title", focus == FormField::Title);
    let title_inner = title_block.inner(rows[0]);
    frame.render_widget(
        Paragraph::new(app.form.title.as_str())
            .style(input_style)
            .block(title_block),
        rows[0],
    );

    let description_block = rounded_block("Description", focus == FormField::Description);
    let description_inner = description_block.inner(rows[1]);
    frame.render_widget(
        Paragraph::new(app.form.description.as_str())
            .style(input_style)
            .wrap(Wrap { trim: false })
            .block(description_block),
        rows[1],
    );

    let interval_label = app
        .selected_choice()
        .map(|choice| choice.label())
        .unwrap_or_default();
    let arrow_style = Style::default().fg(if focus == FormField::Interval {
        PRIMARY
    } else {
        TEXT_MUTED
    });
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(" ◀ ", arrow_style),
            Span::styled(interval_label, input_style),
            Span::styled(" ▶", arrow_style),
        ]))
        .block(rounded_block("Interval", focus == FormField::Interval)),
        rows[2],
    );

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            " Tab next field  Ctrl+J newline  ←/→ interval  Enter create  Esc back",
            Style::default().fg(TEXT_MUTED),
        ))),
        rows[3],
    );

    if app.alert.is_some() {
        return;
    }
    match focus {
        FormField::Title => frame.set_cursor_position((
            title_inner.x
                + display_width(&app.form.title).min(title_inner.width.saturating_sub(1)),
            title_inner.y,
        )),
        FormField::Description => {
            let line_count = app.form.description.split('\n').count().max(1) as u16;
            let last_len = app
                .form
                .description
                .rsplit('\n')
                .next()
                .map(display_width)
                .unwrap_or(0);
            let max_x = description_inner.width.saturating_sub(1);
            let max_y = description_inner.height.saturating_sub(1);
            frame.set_cursor_position((
                description_inner.x + last_len.min(max_x),
                description_inner.y + (line_count - 1).min(max_y),
            ));
        }
        FormField::Interval => {}
    }
}

/// Terminal columns taken by `text`; wide glyphs count twice.
fn display_width(text: &str) -> u16 {
    u16::try_from(Line::raw(text).width()).unwrap_or(u16::MAX)
}

fn draw_diagnostics(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let diagnostics = &app.diagnostics;
    let label_style = Style::default().fg(TEXT_MUTED);
    let value_style = Style::default().fg(TEXT);

    let (permission, permission_color) = match diagnostics.permission {
        Some(status) if status.is_granted() => (status.as_str(), GREEN),
        Some(status) => (status.as_str(), RED),
        None => ("unknown", YELLOW),
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("  permission  ", label_style),
            Span::styled(permission, Style::default().fg(permission_color)),
        ]),
        Line::from(vec![
            Span::styled("  store key   ", label_style),
            Span::styled(diagnostics.store_key.as_str(), value_style),
        ]),
        Line::from(vec![
            Span::styled("  store path  ", label_style),
            Span::styled(
                diagnostics.store_path.as_deref().unwrap_or("in memory"),
                value_style,
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled("  Channels", label_style)),
    ];
    if diagnostics.channels.is_empty() {
        lines.push(Line::from(Span::styled("    none", label_style)));
    }
    for channel in &diagnostics.channels {
        lines.push(Line::from(vec![
            Span::styled(format!("    {}", channel.id), value_style),
            Span::styled(format!("  {}", channel.name), label_style),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("  Scheduled ({})", diagnostics.scheduled.len()),
        label_style,
    )));
    for scheduled in &diagnostics.scheduled {
        let cadence = match scheduled.trigger.repeat_every_secs {
            Some(secs) => format!("every {}", format_duration(secs.saturating_mul(1000))),
            None => "once".to_string(),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("    {}", scheduled.identifier), value_style),
            Span::styled(format!("  {}", scheduled.content.title), label_style),
            Span::styled(format!("  {cadence}"), Style::default().fg(SECONDARY)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  p request permissions  s test notification  x clear all  r refresh  Esc back",
        Style::default().fg(TEXT_MUTED).add_modifier(Modifier::ITALIC),
    )));

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(rounded_block("Diagnostics", true)),
        area,
    );
}

/// Draw the status bar at the bottom.
fn draw_status_bar(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let key = |text: &'static str| Span::styled(text, Style::default().fg(TEXT_MUTED));
    let hint = |text: &'static str| Span::styled(text, Style::default().fg(BORDER));
    let shortcuts = match app.screen {
        Screen::List => vec![
            key(" q"),
            hint(" quit"),
            key("  n"),
            hint(" new"),
            key("  d"),
            hint(" delete"),
            key("  t"),
            hint(" diagnostics"),
            key("  ↑/↓"),
            hint(" select"),
        ],
        Screen::Create => vec![key(" Enter"), hint(" create"), key("  Esc"), hint(" back")],
        Screen::Diagnostics => vec![key(" Esc"), hint(" back")],
    };

    let right_text = format!(" delivered {}  {} ", app.delivered_count, app.status);
    let right_len = right_text.chars().count() as u16;
    let left_area = Rect {
        width: area.width.saturating_sub(right_len),
        ..area
    };
    let right_area = Rect {
        x: area.x + area.width.saturating_sub(right_len),
        width: right_len.min(area.width),
        ..area
    };

    frame.render_widget(Paragraph::new(Line::from(shortcuts)), left_area);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            right_text,
            Style::default().fg(YELLOW),
        ))),
        right_area,
    );
}

/// Draw the latest delivered notification in the top-right corner of the body.
fn draw_toast(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(toast) = app.toast.as_ref() else {
        return;
    };
    let width = area.width.saturating_sub(4).min(44);
    let toast_area = Rect {
        x: area.x + area.width.saturating_sub(width + 2),
        y: area.y + 1,
        width,
        height: 4.min(area.height),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(PRIMARY))
        .title(Span::styled(
            " Notification ",
            Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(Color::Rgb(20, 20, 20)));
    let lines = vec![
        Line::from(Span::styled(
            toast.title.as_str(),
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            toast.body.as_str(),
            Style::default().fg(TEXT_MUTED),
        )),
    ];
    frame.render_widget(Clear, toast_area);
    frame.render_widget(Paragraph::new(lines).block(block), toast_area);
}

/// Draw the blocking alert box centered over everything.
fn draw_alert(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(alert) = app.alert.as_ref() else {
        return;
    };
    let [alert_area] = Layout::horizontal([Constraint::Length(48)])
        .flex(Flex::Center)
        .areas(area);
    let [alert_area] = Layout::vertical([Constraint::Length(7)])
        .flex(Flex::Center)
        .areas(alert_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(PRIMARY))
        .title(Span::styled(
            format!(" {} ", alert.title),
            Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(Color::Rgb(20, 20, 20)));
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {}", alert.message),
            Style::default().fg(TEXT),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " Enter to dismiss",
            Style::default().fg(TEXT_MUTED).add_modifier(Modifier::ITALIC),
        )),
    ];
    frame.render_widget(Clear, alert_area);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block),
        alert_area,
    );
}

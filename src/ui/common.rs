//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, alert banner, status bar,
//! and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::HealthStatus;

/// Render the header bar with the system status overview.
///
/// Displays: status indicator, time of the last reading, pump state and
/// control mode.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref dashboard) = app.dashboard else {
        let line = Line::from(vec![
            Span::styled(
                " HARVESTWATCH ",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("| Waiting for data..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let status = app
        .active_alert()
        .map_or(HealthStatus::Healthy, |alert| alert.status());

    let pump_style = if app.pump_active() {
        Style::default().fg(app.theme.healthy).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    let line = Line::from(vec![
        Span::styled(format!(" {} ", status.symbol()), app.theme.status_style(status)),
        Span::styled("HARVESTWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ Last reading "),
        Span::styled(
            dashboard.time_label(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" │ Pump "),
        Span::styled(if app.pump_active() { "ON" } else { "OFF" }, pump_style),
        Span::raw(" │ "),
        Span::styled(app.mode_label(), Style::default().fg(app.theme.highlight)),
        Span::raw(" │ Next irrigation "),
        Span::raw(dashboard.next_irrigation),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Title of a view's tab, e.g. " 1:Dashboard ".
pub fn tab_title(view: View) -> String {
    format!(" {}:{} ", view.index() + 1, view.label())
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL.iter().map(|v| Line::from(tab_title(*v))).collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the alert banner.
///
/// The banner persists until a reading clears the condition.
pub fn render_alert(frame: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(alert) = app.active_alert() {
        Line::from(Span::styled(
            format!(" {} ", alert.message(&app.thresholds)),
            app.theme.status_style(alert.status()),
        ))
    } else if let Some(ref err) = app.load_error {
        Line::from(Span::styled(
            format!(" {} ", err),
            Style::default().fg(app.theme.warning),
        ))
    } else if app.dashboard.is_some() {
        Line::from(Span::styled(
            " All systems normal",
            Style::default().fg(app.theme.healthy),
        ))
    } else {
        Line::default()
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows: data source, time since last update, available controls.
/// Also displays temporary status messages.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = "Tab:switch a:mode p:pump r:poll e:export ?:help q:quit";
    let status = if let Some(ref dashboard) = app.dashboard {
        format!(
            " {} | Updated {:.1}s ago | {} readings | {}",
            app.source_description(),
            dashboard.received_at.elapsed().as_secs_f64(),
            app.readings_received,
            controls,
        )
    } else if let Some(ref err) = app.load_error {
        format!(" Error: {} | q:quit r:retry", err)
    } else {
        format!(" {} | Waiting for data... | q:quit", app.source_description())
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Views"),
        Line::from("  Tab ←/→ h/l  Switch views"),
        Line::from("  1 2 3        Dashboard, Trends, Solar"),
        Line::from(""),
        section(" Pump"),
        Line::from("  a            Toggle auto/manual mode"),
        Line::from("  p            Toggle pump (manual only)"),
        Line::from(""),
        section(" General"),
        Line::from("  r            Poll source now"),
        Line::from("  e            Export to JSON"),
        Line::from("  q            Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 18u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// A bordered panel block in the theme's style.
pub fn panel(app: &App, title: &str) -> Block<'static> {
    Block::default()
        .title(Span::styled(format!(" {} ", title), app.theme.header))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

/// Centered one-line placeholder for views without data.
pub fn render_placeholder(frame: &mut Frame, app: &App, area: Rect, title: &str, text: &str) {
    let paragraph = Paragraph::new(text.to_string())
        .alignment(ratatui::layout::Alignment::Center)
        .style(app.theme.muted_style())
        .block(panel(app, title));
    frame.render_widget(paragraph, area);
}

//! Dashboard view rendering.
//!
//! Shows the latest reading as labelled progress bars, next to the pump
//! panel and the usage statistics.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph},
    Frame,
};

use super::common::{panel, render_placeholder};
use crate::app::App;
use crate::data::Metric;

/// Rows per progress bar (label line + bar line + spacer).
const GAUGE_HEIGHT: u16 = 3;

/// Render the Dashboard view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref dashboard) = app.dashboard else {
        render_placeholder(frame, app, area, "Readings", "Waiting for the first reading...");
        return;
    };

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(area);

    // Readouts
    let block = panel(app, "Readings");
    let inner = block.inner(left);
    frame.render_widget(block, left);

    let gauges = dashboard.gauges();
    let rows = Layout::vertical(
        gauges
            .iter()
            .map(|_| Constraint::Length(GAUGE_HEIGHT))
            .chain(std::iter::once(Constraint::Min(0))),
    )
    .split(inner);

    let colors = [
        app.theme.metric_color(Metric::SoilMoisture),
        app.theme.metric_color(Metric::WaterLevel),
        app.theme.metric_color(Metric::SolarVoltage),
        app.theme.metric_color(Metric::Temperature),
        app.theme.metric_color(Metric::Humidity),
        app.theme.efficiency,
    ];

    for ((gauge, color), row) in gauges.iter().zip(colors).zip(rows.iter()) {
        let [label_area, bar_area, _] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(*row);

        let label = Line::from(vec![
            Span::styled(
                format!(" {:<14}", gauge.title),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(gauge.value.clone()),
        ]);
        frame.render_widget(Paragraph::new(label), label_area);

        let bar = Gauge::default()
            .gauge_style(Style::default().fg(color))
            .ratio(gauge.percent / 100.0)
            .label(format!("{:.0}%", gauge.percent));
        frame.render_widget(bar, bar_area);
    }

    let [pump_area, stats_area] =
        Layout::vertical([Constraint::Length(8), Constraint::Min(5)]).areas(right);

    render_pump(frame, app, pump_area);
    render_stats(frame, app, stats_area);
}

fn render_pump(frame: &mut Frame, app: &App, area: Rect) {
    let (state, style) = if app.pump_active() {
        (
            "ON",
            Style::default().fg(app.theme.healthy).add_modifier(Modifier::BOLD),
        )
    } else {
        ("OFF", app.theme.muted_style().add_modifier(Modifier::BOLD))
    };

    let hint = if app.auto_mode {
        "a: take manual control"
    } else {
        "p: toggle pump   a: back to auto"
    };

    let next = app
        .dashboard
        .as_ref()
        .map_or("-", |d| d.next_irrigation);

    let lines = vec![
        Line::from(vec![Span::raw(" Pump:    "), Span::styled(state, style)]),
        Line::from(vec![
            Span::raw(" Mode:    "),
            Span::styled(app.mode_label(), Style::default().fg(app.theme.highlight)),
        ]),
        Line::from(format!(" Runtime: {:.2} min", app.runtime.minutes())),
        Line::from(format!(" Next irrigation: {}", next)),
        Line::from(""),
        Line::from(Span::styled(format!(" {}", hint), app.theme.muted_style())),
    ];

    frame.render_widget(Paragraph::new(lines).block(panel(app, "Pump Control")), area);
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let stats = app.usage();
    let row = |label: &'static str, value: String| {
        Line::from(vec![
            Span::raw(format!(" {:<14}", label)),
            Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
        ])
    };

    let lines = vec![
        row("Daily usage", stats.daily_usage_label()),
        row("Water saved", stats.water_saved_label()),
        row("Energy used", stats.energy_label()),
    ];

    frame.render_widget(Paragraph::new(lines).block(panel(app, "Usage")), area);
}

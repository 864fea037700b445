//! Solar view rendering.
//!
//! Bar chart of the solar voltage of the most recent readings.

use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Bar, BarChart, BarGroup},
    Frame,
};

use super::common::{panel, render_placeholder};
use crate::app::App;
use crate::data::{Metric, RECENT_WINDOW};

/// Bars are drawn in hundredths of a volt, so the axis tops out at 3.5 V.
const SCALE: f64 = 100.0;
const Y_MAX_VOLTS: f64 = 3.5;

/// Render the Solar view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let recent: Vec<_> = app.history.recent(RECENT_WINDOW).collect();
    if recent.is_empty() {
        render_placeholder(frame, app, area, "Solar Voltage", "No history yet");
        return;
    }

    let color = app.theme.metric_color(Metric::SolarVoltage);
    let bars: Vec<Bar> = recent
        .iter()
        .map(|entry| {
            Bar::default()
                .value(to_bar_value(entry.solar_voltage))
                .text_value(format!("{:.2}", entry.solar_voltage))
                .label(Line::from(entry.label.clone()))
                .style(Style::default().fg(color))
        })
        .collect();

    let block = panel(app, &format!("Solar Voltage (last {})", recent.len()));
    let inner_width = block.inner(area).width;

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width(inner_width, bars.len()))
        .bar_gap(1)
        .max(to_bar_value(Y_MAX_VOLTS));

    frame.render_widget(chart, area);
}

/// Readings above the axis are drawn as full bars.
fn to_bar_value(volts: f64) -> u64 {
    (volts.clamp(0.0, Y_MAX_VOLTS) * SCALE).round() as u64
}

/// Widest bar that fits `count` bars with one-column gaps, at least 3.
fn bar_width(width: u16, count: usize) -> u16 {
    let count = count.max(1) as u16;
    let gaps = count - 1;
    (width.saturating_sub(gaps) / count).clamp(3, 12)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_value() {
        assert_eq!(to_bar_value(2.8), 280);
        assert_eq!(to_bar_value(3.5), 350);
        assert_eq!(to_bar_value(-0.1), 0);
        assert_eq!(to_bar_value(4.2), 350);
        assert_eq!(to_bar_value(1e17), 350);
        assert_eq!(to_bar_value(f64::NAN), 0);
    }

    #[test]
    fn test_bar_width() {
        assert_eq!(bar_width(109, 10), 10);
        assert_eq!(bar_width(20, 10), 3);
        assert_eq!(bar_width(200, 1), 12);
    }
}

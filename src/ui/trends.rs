//! Trends view rendering.
//!
//! Line chart of soil moisture, water level, temperature and humidity over
//! the whole history window, on a shared 0-100 axis.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Chart, Dataset, GraphType, LegendPosition},
    Frame,
};

use super::common::{panel, render_placeholder};
use crate::app::App;
use crate::data::Metric;

/// Upper bound of the shared y axis.
const Y_MAX: f64 = 100.0;

/// Render the Trends view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let history = &app.history;
    if history.is_empty() {
        render_placeholder(frame, app, area, "Trends", "No history yet");
        return;
    }

    let series: Vec<(Metric, Vec<(f64, f64)>)> = Metric::TRENDS
        .iter()
        .map(|&metric| (metric, history.trend_points(metric)))
        .collect();

    let datasets: Vec<Dataset> = series
        .iter()
        .filter(|(_, points)| !points.is_empty())
        .map(|(metric, points)| {
            Dataset::default()
                .name(metric.label())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(app.theme.metric_color(*metric)))
                .data(points)
        })
        .collect();

    let labels = history.labels();
    let x_max = (history.len().saturating_sub(1)).max(1) as f64;
    let x_labels: Vec<Span> = match (labels.first(), labels.last()) {
        (Some(first), Some(last)) if labels.len() > 1 => {
            vec![Span::raw(first.to_string()), Span::raw(last.to_string())]
        }
        (Some(only), _) => vec![Span::raw(only.to_string())],
        _ => Vec::new(),
    };

    let axis_style = app.theme.muted_style();
    let title = format!("Trends (last {} readings)", history.len());

    let chart = Chart::new(datasets)
        .block(panel(app, &title))
        .legend_position(Some(LegendPosition::TopLeft))
        .x_axis(
            Axis::default()
                .style(axis_style)
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(axis_style)
                .bounds([0.0, Y_MAX])
                .labels(vec![
                    Span::raw("0"),
                    Span::styled("50", Style::default().add_modifier(Modifier::DIM)),
                    Span::raw("100"),
                ]),
        );

    frame.render_widget(chart, area);
}

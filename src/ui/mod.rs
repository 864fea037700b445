//! Terminal rendering.
//!
//! ```text
//! ┌ header: status, last reading, pump, mode ─────────────┐
//! │ tabs: 1:Dashboard | 2:Trends | 3:Solar                │
//! │ alert banner                                          │
//! │ view content                                          │
//! └ status bar ───────────────────────────────────────────┘
//! ```

pub mod common;
pub mod dashboard;
pub mod solar;
pub mod theme;
pub mod trends;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, View};

/// Minimum terminal size for a usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 16;

/// Draw the whole screen.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.warning));
        let top = (area.height / 2).saturating_sub(2);
        let centered = Rect::new(0, top, area.width, 5u16.min(area.height - top));
        frame.render_widget(paragraph, centered);
        return;
    }

    let [header, tabs, alert, content, status] = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Tabs
        Constraint::Length(1), // Alert banner
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .areas(area);

    common::render_header(frame, app, header);
    common::render_tabs(frame, app, tabs);
    common::render_alert(frame, app, alert);

    match app.current_view {
        View::Dashboard => dashboard::render(frame, app, content),
        View::Trends => trends::render(frame, app, content),
        View::Solar => solar::render(frame, app, content),
    }

    common::render_status_bar(frame, app, status);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Thresholds;
    use crate::source::{ChannelSender, ChannelSource, FeedEvent, Reading};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn test_app() -> (ChannelSender, App) {
        let (tx, source) = ChannelSource::create("test");
        let app = App::with_theme(Box::new(source), Thresholds::default(), Theme::dark());
        (tx, app)
    }

    fn draw(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn app_with_readings(readings: &[Reading]) -> App {
        let (tx, mut app) = test_app();
        for reading in readings {
            tx.send(FeedEvent::Reading(reading.clone()));
            app.reload_data().unwrap();
        }
        app
    }

    #[test]
    fn test_render_waiting() {
        let (_tx, app) = test_app();
        let screen = draw(&app, 100, 30);
        assert!(screen.contains("HARVESTWATCH"));
        assert!(screen.contains("Waiting for"));
    }

    #[test]
    fn test_render_all_views() {
        let mut app = app_with_readings(&[
            Reading::new(45.0, 75.0, 2.8).with_climate(24.0, 60.0),
            Reading::new(40.0, 15.0, 2.1).with_pump(true),
        ]);

        let screen = draw(&app, 100, 30);
        assert!(screen.contains("Soil Moisture"));
        assert!(screen.contains("Low water level"));
        assert!(screen.contains("Pump Control"));

        app.current_view = View::Trends;
        let screen = draw(&app, 100, 30);
        assert!(screen.contains("Trends (last 2 readings)"));

        app.current_view = View::Solar;
        let screen = draw(&app, 100, 30);
        assert!(screen.contains("Solar Voltage (last 2)"));
        assert!(screen.contains("2.80"));
    }

    #[test]
    fn test_render_out_of_range_voltage() {
        let mut app = app_with_readings(&[
            Reading::new(45.0, 75.0, 2.8),
            Reading::new(45.0, 75.0, 1e17),
        ]);

        app.current_view = View::Solar;
        let screen = draw(&app, 100, 30);
        assert!(screen.contains("Solar Voltage (last 2)"));

        app.current_view = View::Dashboard;
        assert!(draw(&app, 100, 30).contains("Solar Voltage"));
    }

    #[test]
    fn test_render_no_data_banner() {
        let (tx, mut app) = test_app();
        tx.send(FeedEvent::Missing);
        app.reload_data().unwrap();

        let screen = draw(&app, 100, 30);
        assert!(screen.contains("Failed to fetch data from feed"));
    }

    #[test]
    fn test_render_help_and_small_terminal() {
        let (_tx, mut app) = test_app();
        app.show_help = true;
        assert!(draw(&app, 100, 30).contains("Keyboard Shortcuts"));

        assert!(draw(&app, 40, 10).contains("Terminal too small"));
    }
}

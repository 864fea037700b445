//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection. Each
//! metric keeps the same color on every view so a series can be recognised
//! across the gauges, the trend chart and the solar bars.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{HealthStatus, Metric};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    pub warning: Color,
    pub critical: Color,
    pub healthy: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Dimmed text (axis labels, hints).
    pub muted: Color,
    /// Style for panel titles and key names in help.
    pub header: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub border_type: BorderType,

    // Per-metric series colors
    pub soil: Color,
    pub water: Color,
    pub solar: Color,
    pub temperature: Color,
    pub humidity: Color,
    pub efficiency: Color,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            muted: Color::DarkGray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
            soil: Color::Rgb(0xfe, 0x9d, 0x1a),
            // The tank navy is unreadable on black; lighten it
            water: Color::Rgb(0x3a, 0x8f, 0xd9),
            solar: Color::Rgb(0xf5, 0xd0, 0x2a),
            temperature: Color::Rgb(255, 99, 132),
            humidity: Color::Rgb(54, 162, 235),
            efficiency: Color::Green,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            muted: Color::Gray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
            soil: Color::Rgb(0xfe, 0x9d, 0x1a),
            water: Color::Rgb(0x11, 0x38, 0x5a),
            solar: Color::Rgb(0xc9, 0x8a, 0x00),
            temperature: Color::Rgb(255, 99, 132),
            humidity: Color::Rgb(54, 162, 235),
            efficiency: Color::Green,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get style for a health status
    pub fn status_style(&self, status: HealthStatus) -> Style {
        match status {
            HealthStatus::Healthy => Style::default().fg(self.healthy),
            HealthStatus::Warning => Style::default().fg(self.warning),
            HealthStatus::Critical => {
                Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
            }
        }
    }

    /// Series color of a metric.
    pub fn metric_color(&self, metric: Metric) -> Color {
        match metric {
            Metric::SoilMoisture => self.soil,
            Metric::WaterLevel => self.water,
            Metric::SolarVoltage => self.solar,
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
        }
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }
}

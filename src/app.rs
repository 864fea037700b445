//! Application state and navigation logic.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde_json::json;
use tracing::{debug, error, info};

use crate::data::{Alert, Dashboard, History, PumpRuntime, Thresholds, UsageStats};
use crate::source::{DataSource, FeedEvent, Reading};
use crate::ui::Theme;

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Latest readout: gauges, pump and usage.
    Dashboard,
    /// Line chart of the 24-entry history.
    Trends,
    /// Bar chart of the last ten solar voltages.
    Solar,
}

impl View {
    pub const ALL: [View; 3] = [View::Dashboard, View::Trends, View::Solar];

    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Dashboard => View::Trends,
            View::Trends => View::Solar,
            View::Solar => View::Dashboard,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Dashboard => View::Solar,
            View::Trends => View::Dashboard,
            View::Solar => View::Trends,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Trends => "Trends",
            View::Solar => "Solar",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            View::Dashboard => 0,
            View::Trends => 1,
            View::Solar => 2,
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub dashboard: Option<Dashboard>,
    pub history: History,
    pub runtime: PumpRuntime,
    pub load_error: Option<String>,
    /// Set when the feed delivered a null payload; cleared by the next reading.
    pub no_data: bool,
    pub thresholds: Thresholds,
    pub readings_received: u64,

    // Pump control
    /// Automatic mode: the controller drives the pump and manual control is
    /// locked.
    pub auto_mode: bool,
    /// Pump state commanded in manual mode.
    pub manual_pump: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App with the given data source and thresholds.
    pub fn new(source: Box<dyn DataSource>, thresholds: Thresholds) -> Self {
        Self::with_theme(source, thresholds, Theme::auto_detect())
    }

    pub fn with_theme(source: Box<dyn DataSource>, thresholds: Thresholds, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Dashboard,
            show_help: false,
            source,
            dashboard: None,
            history: History::new(),
            runtime: PumpRuntime::new(),
            load_error: None,
            no_data: false,
            thresholds,
            readings_received: 0,
            auto_mode: true,
            manual_pump: false,
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Poll the data source for new data.
    ///
    /// Returns Ok(true) if the display state changed, Ok(false) if there was
    /// nothing new.
    pub fn reload_data(&mut self) -> Result<bool> {
        let event = self.source.poll();
        self.load_error = self.source.error();

        match event {
            Some(FeedEvent::Reading(reading)) => {
                self.ingest(reading);
                Ok(true)
            }
            Some(FeedEvent::Missing) => {
                if !self.no_data {
                    error!("Failed to fetch data from {}", self.source.description());
                }
                // Keep the last dashboard on screen under the banner
                self.no_data = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Recompute all derived state for a new reading.
    pub fn ingest(&mut self, reading: Reading) {
        if self.runtime.observe(&reading) {
            debug!("Pump runtime now {:.2} min", self.runtime.minutes());
        }
        self.history.record(&reading);

        let dashboard = Dashboard::from_reading(reading, &self.thresholds);
        if let Some(alert) = dashboard.alert {
            debug!("Alert raised: {:?}", alert);
        }
        self.dashboard = Some(dashboard);
        self.no_data = false;
        self.readings_received += 1;
    }

    /// The alert shown in the banner. Missing data takes precedence over
    /// reading-based alerts.
    pub fn active_alert(&self) -> Option<Alert> {
        if self.no_data {
            Some(Alert::NoData)
        } else {
            self.dashboard.as_ref().and_then(|d| d.alert)
        }
    }

    pub fn usage(&self) -> UsageStats {
        self.runtime.stats()
    }

    /// Pump state to display: the controller's report in automatic mode, the
    /// manual command otherwise.
    pub fn pump_active(&self) -> bool {
        if self.auto_mode {
            self.dashboard
                .as_ref()
                .is_some_and(|d| d.reading.pump_status)
        } else {
            self.manual_pump
        }
    }

    pub fn mode_label(&self) -> &'static str {
        if self.auto_mode {
            "AUTO"
        } else {
            "MANUAL"
        }
    }

    /// Switch between automatic and manual pump control.
    pub fn toggle_mode(&mut self) {
        if self.auto_mode {
            // Take over from the current pump state
            self.manual_pump = self.pump_active();
        }
        self.auto_mode = !self.auto_mode;
        info!("Pump control mode: {}", self.mode_label());

        let message = if self.auto_mode {
            "Automatic mode: pump follows the controller"
        } else {
            "Manual mode: press p to toggle the pump"
        };
        self.set_status_message(message.to_string());
    }

    /// Toggle the pump. Refused in automatic mode.
    ///
    /// Returns true if the command was accepted.
    pub fn toggle_pump(&mut self) -> bool {
        if self.auto_mode {
            self.set_status_message("Switch to manual mode (a) to control the pump".to_string());
            return false;
        }

        self.manual_pump = !self.manual_pump;
        let state = if self.manual_pump { "ON" } else { "OFF" };
        info!("Manual pump command: {}", state);
        self.set_status_message(format!("Pump {} (manual)", state));
        true
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current dashboard state to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(ref dashboard) = self.dashboard else {
            anyhow::bail!("No data to export");
        };

        let history: Vec<_> = self.history.entries().collect();
        let export = json!({
            "reading": dashboard.reading,
            "observed_at": dashboard.observed_at.to_rfc3339(),
            "derived": {
                "efficiency": dashboard.efficiency,
                "next_irrigation": dashboard.next_irrigation,
                "alert": self.active_alert().map(|a| a.message(&self.thresholds)),
            },
            "usage": {
                "pump_runtime_minutes": self.runtime.minutes(),
                "stats": self.usage(),
            },
            "control": {
                "mode": self.mode_label(),
                "pump": self.pump_active(),
            },
            "history": history,
        });

        let json = serde_json::to_string_pretty(&export)?;
        std::fs::write(path, json)?;

        Ok(())
    }
}

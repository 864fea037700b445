//! Display state derived from the latest reading.
//!
//! This module turns a raw [`Reading`] into everything the dashboard shows
//! for it: formatted readouts, bar ratios, efficiency, the alert and the
//! next-irrigation estimate.

use std::time::Instant;

use chrono::{DateTime, Local};

use super::metrics::{
    efficiency, next_irrigation, percent, Alert, Thresholds, SOLAR_FULL_SCALE,
    TEMPERATURE_FULL_SCALE,
};
use super::timestamp::{format_time, observed_at};
use crate::source::Reading;

/// The latest reading with its derived display values.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub reading: Reading,
    /// When the reading was taken.
    pub observed_at: DateTime<Local>,
    /// When the dashboard received it.
    pub received_at: Instant,
    /// Solar efficiency in percent.
    pub efficiency: u8,
    /// Alert raised by this reading, if any.
    pub alert: Option<Alert>,
    /// Next-irrigation estimate.
    pub next_irrigation: &'static str,
}

/// A labelled progress bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Gauge {
    pub title: &'static str,
    /// Formatted readout, e.g. "2.80 V".
    pub value: String,
    /// Bar fill in percent, 0-100.
    pub percent: f64,
}

impl Dashboard {
    /// Compute all derived display state for a reading.
    pub fn from_reading(reading: Reading, thresholds: &Thresholds) -> Self {
        Self {
            observed_at: observed_at(&reading),
            received_at: Instant::now(),
            efficiency: efficiency(&reading),
            alert: Alert::evaluate(&reading, thresholds),
            next_irrigation: next_irrigation(reading.soil_moisture),
            reading,
        }
    }

    /// Wall-clock label of when the reading was taken.
    pub fn time_label(&self) -> String {
        format_time(&self.observed_at)
    }

    pub fn pump_label(&self) -> &'static str {
        if self.reading.pump_status {
            "ON"
        } else {
            "OFF"
        }
    }

    /// The six readout bars, in display order.
    pub fn gauges(&self) -> Vec<Gauge> {
        let r = &self.reading;
        vec![
            Gauge {
                title: "Soil Moisture",
                value: format!("{}%", r.soil_moisture),
                percent: percent(r.soil_moisture, 100.0),
            },
            Gauge {
                title: "Water Level",
                value: format!("{}%", r.water_level),
                percent: percent(r.water_level, 100.0),
            },
            Gauge {
                title: "Solar Voltage",
                value: format!("{:.2} V", r.solar_voltage),
                percent: percent(r.solar_voltage, SOLAR_FULL_SCALE),
            },
            Gauge {
                title: "Temperature",
                value: format_optional(r.temperature, "°C"),
                percent: r.temperature.map_or(0.0, |t| percent(t, TEMPERATURE_FULL_SCALE)),
            },
            Gauge {
                title: "Humidity",
                value: format_optional(r.humidity, "%"),
                percent: r.humidity.map_or(0.0, |h| percent(h, 100.0)),
            },
            Gauge {
                title: "Efficiency",
                value: format!("{}%", self.efficiency),
                percent: f64::from(self.efficiency),
            },
        ]
    }
}

fn format_optional(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{}{}", v, unit),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_reading() {
        let reading = Reading::new(45.0, 75.0, 2.8);
        let dashboard = Dashboard::from_reading(reading, &Thresholds::default());

        assert_eq!(dashboard.efficiency, 85);
        assert!(dashboard.alert.is_none());
        assert_eq!(dashboard.next_irrigation, "1:00");
        assert_eq!(dashboard.pump_label(), "OFF");
    }

    #[test]
    fn test_gauges() {
        let reading = Reading::new(45.0, 75.0, 2.8).with_climate(25.0, 60.0);
        let dashboard = Dashboard::from_reading(reading, &Thresholds::default());
        let gauges = dashboard.gauges();

        assert_eq!(gauges.len(), 6);
        assert_eq!(gauges[0].value, "45%");
        assert_eq!(gauges[2].value, "2.80 V");
        assert_eq!(gauges[3].value, "25°C");
        assert_eq!(gauges[3].percent, 50.0);
        assert_eq!(gauges[5].percent, 85.0);
        assert!(gauges.iter().all(|g| (0.0..=100.0).contains(&g.percent)));
    }

    #[test]
    fn test_gauges_without_climate() {
        let dashboard =
            Dashboard::from_reading(Reading::new(45.0, 75.0, 2.8), &Thresholds::default());
        let gauges = dashboard.gauges();
        assert_eq!(gauges[3].value, "-");
        assert_eq!(gauges[4].percent, 0.0);
    }
}

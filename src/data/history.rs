//! Rolling history of recent readings for the trend and solar charts.

use std::collections::VecDeque;

use serde::Serialize;

use super::timestamp::{format_time, observed_at};
use crate::source::Reading;

/// Maximum number of readings to keep.
pub const HISTORY_CAPACITY: usize = 24;

/// Number of most recent readings shown in the short-range (solar) chart.
pub const RECENT_WINDOW: usize = 10;

/// A metric tracked in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    SoilMoisture,
    WaterLevel,
    SolarVoltage,
    Temperature,
    Humidity,
}

impl Metric {
    /// Metrics plotted on the trend chart.
    pub const TRENDS: [Metric; 4] = [
        Metric::SoilMoisture,
        Metric::WaterLevel,
        Metric::Temperature,
        Metric::Humidity,
    ];

    /// Returns the chart legend label for this metric.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::SoilMoisture => "Soil Moisture (%)",
            Metric::WaterLevel => "Water Level (%)",
            Metric::SolarVoltage => "Solar Voltage (V)",
            Metric::Temperature => "Temperature (°C)",
            Metric::Humidity => "Humidity (%)",
        }
    }
}

/// One reading's worth of history, all metrics aligned to one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// Wall-clock label of when the reading was taken.
    pub label: String,
    pub soil_moisture: f64,
    pub water_level: f64,
    pub solar_voltage: f64,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pump_active: bool,
}

impl HistoryEntry {
    fn from_reading(reading: &Reading) -> Self {
        Self {
            label: format_time(&observed_at(reading)),
            soil_moisture: reading.soil_moisture,
            water_level: reading.water_level,
            solar_voltage: reading.solar_voltage,
            temperature: reading.temperature,
            humidity: reading.humidity,
            pump_active: reading.pump_status,
        }
    }

    /// Value of a metric in this entry, if the reading carried it.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::SoilMoisture => Some(self.soil_moisture),
            Metric::WaterLevel => Some(self.water_level),
            Metric::SolarVoltage => Some(self.solar_voltage),
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
        }
    }
}

/// Fixed-capacity FIFO window of recent readings.
///
/// Every metric sequence is a projection of the same entry queue, so all
/// sequences have the same length and share the same labels.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create an empty history holding up to [`HISTORY_CAPACITY`] readings.
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Create an empty history with a custom capacity (at least 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a reading, evicting the oldest once over capacity.
    pub fn record(&mut self, reading: &Reading) {
        self.entries.push_back(HistoryEntry::from_reading(reading));
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Time labels, oldest first.
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    /// The full sequence for one metric, oldest first.
    pub fn series(&self, metric: Metric) -> Vec<Option<f64>> {
        self.entries.iter().map(|e| e.value(metric)).collect()
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    /// Chart points `(index, value)` for a metric, skipping entries that
    /// lack the metric.
    pub fn trend_points(&self, metric: Metric) -> Vec<(f64, f64)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.value(metric).map(|v| (i as f64, v)))
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

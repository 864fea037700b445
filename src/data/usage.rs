//! Pump runtime accumulation and the usage statistics derived from it.

use serde::Serialize;

use crate::source::Reading;

/// Pump-on time credited for each reading that reports the pump active:
/// one reporting interval of 5 seconds, in minutes.
pub const RUNTIME_INCREMENT_MINUTES: f64 = 5.0 / 60.0;

const LITERS_USED_PER_MINUTE: f64 = 2.5;
const LITERS_SAVED_PER_MINUTE: f64 = 1.8;
const KWH_PER_MINUTE: f64 = 0.05;

/// Approximate cumulative pump-on time.
///
/// Never decreases; grows only on readings with the pump active.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PumpRuntime {
    minutes: f64,
}

impl PumpRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for a reading. Returns true if the runtime increased.
    pub fn observe(&mut self, reading: &Reading) -> bool {
        if reading.pump_status {
            self.minutes += RUNTIME_INCREMENT_MINUTES;
            true
        } else {
            false
        }
    }

    /// Accumulated runtime in minutes.
    pub fn minutes(&self) -> f64 {
        self.minutes
    }

    pub fn stats(&self) -> UsageStats {
        UsageStats::from_runtime(self.minutes)
    }
}

/// Usage statistics estimated linearly from pump runtime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageStats {
    /// Water pumped today, in liters.
    pub daily_usage_liters: u64,
    /// Water saved compared to timer irrigation, in liters.
    pub water_saved_liters: u64,
    /// Pump energy consumed, in kWh.
    pub energy_kwh: f64,
}

impl UsageStats {
    pub fn from_runtime(minutes: f64) -> Self {
        Self {
            daily_usage_liters: (minutes * LITERS_USED_PER_MINUTE).round() as u64,
            water_saved_liters: (minutes * LITERS_SAVED_PER_MINUTE).round() as u64,
            energy_kwh: minutes * KWH_PER_MINUTE,
        }
    }

    pub fn daily_usage_label(&self) -> String {
        format!("{} L", self.daily_usage_liters)
    }

    pub fn water_saved_label(&self) -> String {
        format!("{} L", self.water_saved_liters)
    }

    pub fn energy_label(&self) -> String {
        format!("{:.2} kWh", self.energy_kwh)
    }
}

//! Derived metrics and alert evaluation.
//!
//! Everything here is a pure function of a [`Reading`]: efficiency, the
//! active alert, the next-irrigation estimate and progress-bar ratios.

use serde::{Deserialize, Serialize};

use crate::source::Reading;

/// Solar voltage that counts as full output.
pub const SOLAR_FULL_SCALE: f64 = 3.3;
/// At or below this voltage the panel is not producing usefully.
pub const EFFICIENCY_MIN_VOLTAGE: f64 = 2.0;
/// Temperature that fills the temperature bar.
pub const TEMPERATURE_FULL_SCALE: f64 = 50.0;

/// Thresholds for alert evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Water level (%) below which the tank is considered low.
    pub low_water: f64,
    /// Soil moisture (%) above which the soil is considered over-wet.
    pub over_wet: f64,
    /// Solar voltage below which the system runs on backup power.
    pub low_power: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low_water: 20.0,
            over_wet: 80.0,
            low_power: 1.0,
        }
    }
}

/// Health status shown next to alerts and in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "OK",
            HealthStatus::Warning => "WARN",
            HealthStatus::Critical => "CRIT",
        }
    }
}

/// A condition that shows the alert banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    /// Tank level below the low-water threshold.
    LowWater,
    /// Soil moisture above the over-wet threshold.
    OverWet,
    /// Solar voltage below the low-power threshold.
    LowPower,
    /// The feed delivered no data.
    NoData,
}

impl Alert {
    /// Evaluate the alert for a reading. The first matching condition wins:
    /// low water, then over-wet soil, then low solar power.
    pub fn evaluate(reading: &Reading, thresholds: &Thresholds) -> Option<Alert> {
        if reading.water_level < thresholds.low_water {
            Some(Alert::LowWater)
        } else if reading.soil_moisture > thresholds.over_wet {
            Some(Alert::OverWet)
        } else if reading.solar_voltage < thresholds.low_power {
            Some(Alert::LowPower)
        } else {
            None
        }
    }

    /// Banner text for this alert.
    pub fn message(&self, thresholds: &Thresholds) -> String {
        match self {
            Alert::LowWater => format!(
                "⚠️ Low water level! Tank is below {}%",
                thresholds.low_water
            ),
            Alert::OverWet => "⚠️ Soil is very wet! Consider reducing irrigation".to_string(),
            Alert::LowPower => "⚠️ Low solar power! System running on backup".to_string(),
            Alert::NoData => "⚠️ Failed to fetch data from feed".to_string(),
        }
    }

    pub fn status(&self) -> HealthStatus {
        match self {
            Alert::LowWater | Alert::NoData => HealthStatus::Critical,
            Alert::OverWet | Alert::LowPower => HealthStatus::Warning,
        }
    }
}

/// Solar efficiency in percent.
///
/// Zero at or below [`EFFICIENCY_MIN_VOLTAGE`], otherwise the voltage as a
/// share of [`SOLAR_FULL_SCALE`], rounded and capped at 100.
pub fn efficiency(reading: &Reading) -> u8 {
    if reading.solar_voltage > EFFICIENCY_MIN_VOLTAGE {
        percent(reading.solar_voltage, SOLAR_FULL_SCALE).round() as u8
    } else {
        0
    }
}

/// Estimated time until the next irrigation, bucketed by soil moisture.
pub fn next_irrigation(soil_moisture: f64) -> &'static str {
    if soil_moisture > 50.0 {
        "2:30"
    } else if soil_moisture > 30.0 {
        "1:00"
    } else {
        "Now"
    }
}

/// `value` as a percentage of `full_scale`, clamped to 0-100.
pub fn percent(value: f64, full_scale: f64) -> f64 {
    let pct = value / full_scale * 100.0;
    if pct.is_nan() {
        0.0
    } else {
        pct.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_reading() {
        let reading = Reading::new(45.0, 75.0, 2.8);
        let thresholds = Thresholds::default();

        assert_eq!(efficiency(&reading), 85);
        assert_eq!(Alert::evaluate(&reading, &thresholds), None);
        assert_eq!(next_irrigation(reading.soil_moisture), "1:00");
    }

    #[test]
    fn test_efficiency_zero_at_or_below_threshold() {
        for voltage in [0.0, 1.0, 1.99, 2.0] {
            assert_eq!(efficiency(&Reading::new(50.0, 50.0, voltage)), 0);
        }
        assert!(efficiency(&Reading::new(50.0, 50.0, 2.01)) > 0);
    }

    #[test]
    fn test_efficiency_bounded() {
        let mut voltage = -1.0;
        while voltage < 10.0 {
            let e = efficiency(&Reading::new(50.0, 50.0, voltage));
            assert!(e <= 100);
            voltage += 0.05;
        }
        assert_eq!(efficiency(&Reading::new(50.0, 50.0, 3.3)), 100);
        assert_eq!(efficiency(&Reading::new(50.0, 50.0, 5.0)), 100);
    }

    #[test]
    fn test_alert_priority() {
        let thresholds = Thresholds::default();

        // Low water beats over-wet
        let reading = Reading::new(90.0, 10.0, 2.8);
        assert_eq!(Alert::evaluate(&reading, &thresholds), Some(Alert::LowWater));

        // Over-wet beats low power
        let reading = Reading::new(90.0, 50.0, 0.5);
        assert_eq!(Alert::evaluate(&reading, &thresholds), Some(Alert::OverWet));

        let reading = Reading::new(50.0, 50.0, 0.5);
        assert_eq!(Alert::evaluate(&reading, &thresholds), Some(Alert::LowPower));
    }

    #[test]
    fn test_alert_boundaries_are_strict() {
        let thresholds = Thresholds::default();
        assert_eq!(Alert::evaluate(&Reading::new(80.0, 20.0, 1.0), &thresholds), None);
    }

    #[test]
    fn test_alert_messages() {
        let thresholds = Thresholds::default();
        assert_eq!(
            Alert::LowWater.message(&thresholds),
            "⚠️ Low water level! Tank is below 20%"
        );
        assert!(Alert::NoData.message(&thresholds).contains("Failed to fetch data"));
        assert_eq!(Alert::NoData.status(), HealthStatus::Critical);
        assert_eq!(Alert::OverWet.status(), HealthStatus::Warning);
    }

    #[test]
    fn test_next_irrigation_buckets() {
        assert_eq!(next_irrigation(75.0), "2:30");
        assert_eq!(next_irrigation(50.0), "1:00");
        assert_eq!(next_irrigation(31.0), "1:00");
        assert_eq!(next_irrigation(30.0), "Now");
        assert_eq!(next_irrigation(0.0), "Now");
    }

    #[test]
    fn test_percent_clamps() {
        assert!((percent(1.65, SOLAR_FULL_SCALE) - 50.0).abs() < 1e-9);
        assert_eq!(percent(60.0, TEMPERATURE_FULL_SCALE), 100.0);
        assert_eq!(percent(-3.0, 100.0), 0.0);
        assert_eq!(percent(f64::NAN, 100.0), 0.0);
    }
}

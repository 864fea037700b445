//! Timer-driven simulated data source.
//!
//! Generates plausible readings locally, for demos and for running the
//! dashboard without access to the field controller.

use std::fmt;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use super::{DataSource, FeedEvent, Reading};

/// Default interval between simulated readings.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Soil moisture below which the simulated controller starts the pump.
const PUMP_ON_BELOW: f64 = 35.0;
/// Soil moisture above which the simulated controller stops the pump.
const PUMP_OFF_ABOVE: f64 = 60.0;
/// The pump cannot run below this tank level.
const PUMP_MIN_WATER: f64 = 10.0;

#[derive(Debug, Clone)]
struct FieldState {
    soil_moisture: f64,
    water_level: f64,
    solar_voltage: f64,
    temperature: f64,
    humidity: f64,
    pump: bool,
}

impl Default for FieldState {
    fn default() -> Self {
        Self {
            soil_moisture: 55.0,
            water_level: 70.0,
            solar_voltage: 2.6,
            temperature: 24.0,
            humidity: 55.0,
            pump: false,
        }
    }
}

/// A data source that produces a new reading every `interval`.
///
/// The field model is a bounded random walk. The pump switches on when the
/// soil dries out and off once it is wet again; while it runs the soil gets
/// wetter and the tank drains.
pub struct SimulatedSource {
    rng: StdRng,
    interval: Duration,
    last_emit: Option<Instant>,
    state: FieldState,
    description: String,
}

impl SimulatedSource {
    /// Create a simulation seeded from the operating system.
    pub fn new(interval: Duration) -> Self {
        Self::from_rng(StdRng::from_os_rng(), interval)
    }

    /// Create a reproducible simulation.
    pub fn with_seed(interval: Duration, seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed), interval)
    }

    fn from_rng(rng: StdRng, interval: Duration) -> Self {
        Self {
            rng,
            interval,
            last_emit: None,
            state: FieldState::default(),
            description: format!("simulation: every {:.1}s", interval.as_secs_f64()),
        }
    }

    /// Advance the field model by one step and return the resulting reading.
    pub fn next_reading(&mut self) -> Reading {
        let state = &mut self.state;
        let rng = &mut self.rng;

        if state.pump {
            state.soil_moisture += rng.random_range(2.0..5.0);
            state.water_level -= rng.random_range(0.5..1.5);
        } else {
            state.soil_moisture -= rng.random_range(0.2..1.5);
            state.water_level += rng.random_range(0.0..0.6);
        }
        state.soil_moisture = state.soil_moisture.clamp(0.0, 100.0);
        state.water_level = state.water_level.clamp(0.0, 100.0);

        state.solar_voltage = (state.solar_voltage + rng.random_range(-0.15..=0.15)).clamp(0.5, 3.3);
        state.temperature = (state.temperature + rng.random_range(-0.4..=0.4)).clamp(10.0, 45.0);
        state.humidity = (state.humidity + rng.random_range(-1.5..=1.5)).clamp(20.0, 95.0);

        if state.water_level < PUMP_MIN_WATER || state.soil_moisture > PUMP_OFF_ABOVE {
            state.pump = false;
        } else if state.soil_moisture < PUMP_ON_BELOW {
            state.pump = true;
        }

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as f64;

        Reading {
            soil_moisture: round_to(state.soil_moisture, 1),
            water_level: round_to(state.water_level, 1),
            solar_voltage: round_to(state.solar_voltage, 2),
            pump_status: state.pump,
            temperature: Some(round_to(state.temperature, 1)),
            humidity: Some(round_to(state.humidity, 1)),
            timestamp: Some(timestamp),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl DataSource for SimulatedSource {
    fn poll(&mut self) -> Option<FeedEvent> {
        let due = self.last_emit.is_none_or(|last| last.elapsed() >= self.interval);
        if !due {
            return None;
        }

        self.last_emit = Some(Instant::now());
        let reading = self.next_reading();
        trace!(?reading, "Simulated reading");
        Some(FeedEvent::Reading(reading))
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        None
    }
}

impl fmt::Debug for SimulatedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedSource")
            .field("interval", &self.interval)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_poll_emits_immediately() {
        let mut source = SimulatedSource::with_seed(Duration::from_secs(3600), 1);
        assert!(matches!(source.poll(), Some(FeedEvent::Reading(_))));
        // Interval has not elapsed yet
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_zero_interval_emits_every_poll() {
        let mut source = SimulatedSource::with_seed(Duration::ZERO, 1);
        for _ in 0..5 {
            assert!(source.poll().is_some());
        }
    }

    #[test]
    fn test_readings_stay_in_range() {
        let mut source = SimulatedSource::with_seed(Duration::ZERO, 42);
        for _ in 0..500 {
            let reading = source.next_reading();
            assert!((0.0..=100.0).contains(&reading.soil_moisture));
            assert!((0.0..=100.0).contains(&reading.water_level));
            assert!((0.5..=3.3).contains(&reading.solar_voltage));
            assert!((10.0..=45.0).contains(&reading.temperature.unwrap()));
            assert!((20.0..=95.0).contains(&reading.humidity.unwrap()));
            assert!(reading.timestamp.is_some());
        }
    }

    #[test]
    fn test_pump_cycles() {
        let mut source = SimulatedSource::with_seed(Duration::ZERO, 3);
        let readings: Vec<Reading> = (0..300).map(|_| source.next_reading()).collect();

        // Soil starts at 55% and only dries while the pump is off,
        // so the controller must switch the pump on at some point.
        assert!(readings.iter().any(|r| r.pump_status));
        assert!(readings.iter().any(|r| !r.pump_status));
    }

    #[test]
    fn test_seeded_sources_agree() {
        let mut a = SimulatedSource::with_seed(Duration::ZERO, 9);
        let mut b = SimulatedSource::with_seed(Duration::ZERO, 9);
        for _ in 0..10 {
            let ra = a.next_reading();
            let rb = b.next_reading();
            assert_eq!(ra.soil_moisture, rb.soil_moisture);
            assert_eq!(ra.solar_voltage, rb.solar_voltage);
            assert_eq!(ra.pump_status, rb.pump_status);
        }
    }

    #[test]
    fn test_description() {
        let source = SimulatedSource::with_seed(Duration::from_secs(5), 1);
        assert_eq!(source.description(), "simulation: every 5.0s");
        assert!(source.error().is_none());
    }
}

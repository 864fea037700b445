//! Layered configuration.
//!
//! Settings are read from an optional TOML file and then from environment
//! variables prefixed with `HARVESTWATCH`, using `__` between sections:
//!
//! ```toml
//! [feed]
//! database_url = "https://water-harvesting-default-rtdb.firebaseio.com"
//! path = "sensorData"
//!
//! [simulation]
//! interval_secs = 5
//!
//! [display]
//! low_water = 20.0
//! ```
//!
//! ```bash
//! HARVESTWATCH_FEED__DATABASE_URL=https://example.firebaseio.com harvestwatch
//! ```
//!
//! Command line flags override both.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::data::Thresholds;
use crate::source::DEFAULT_INTERVAL;

/// File looked up in the working directory when no `--config` is given.
const DEFAULT_CONFIG_NAME: &str = "harvestwatch";

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub feed: FeedSettings,
    pub simulation: SimulationSettings,
    /// Alert thresholds.
    pub display: Thresholds,
}

/// Connection parameters for the realtime database feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Base URL of the database, e.g. `https://<project>.firebaseio.com`.
    pub database_url: Option<String>,
    /// Location of the readings inside the database.
    pub path: String,
    /// Optional database secret or ID token, sent as the `auth` parameter.
    pub auth: Option<String>,
    /// Delay before the push client reconnects a dropped stream.
    pub reconnect_delay_secs: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            database_url: None,
            path: "sensorData".to_string(),
            auth: None,
            reconnect_delay_secs: 5,
        }
    }
}

impl FeedSettings {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

/// Parameters of the local simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Seconds between simulated readings.
    pub interval_secs: f64,
    /// Seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL.as_secs_f64(),
            seed: None,
        }
    }
}

impl SimulationSettings {
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval_secs).unwrap_or(Duration::ZERO)
    }
}

impl Settings {
    /// Load settings from `path` (or `./harvestwatch.*` if present) and the
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let config = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("HARVESTWATCH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.feed.database_url.is_none());
        assert_eq!(settings.feed.path, "sensorData");
        assert_eq!(settings.feed.reconnect_delay(), Duration::from_secs(5));
        assert_eq!(settings.simulation.interval(), Duration::from_secs(5));
        assert_eq!(settings.display, Thresholds::default());
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [feed]
            database_url = "https://example.firebaseio.com"
            path = "field/north"

            [simulation]
            interval_secs = 0.5
            seed = 42

            [display]
            low_water = 25.0
            "#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(
            settings.feed.database_url.as_deref(),
            Some("https://example.firebaseio.com")
        );
        assert_eq!(settings.feed.path, "field/north");
        assert_eq!(settings.feed.reconnect_delay_secs, 5);
        assert_eq!(settings.simulation.interval(), Duration::from_millis(500));
        assert_eq!(settings.simulation.seed, Some(42));

        assert_eq!(settings.display.low_water, 25.0);
        assert_eq!(settings.display.over_wet, 80.0);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        assert!(Settings::load(Some(Path::new("/nonexistent/harvestwatch.toml"))).is_err());
    }

    #[test]
    fn test_negative_interval_is_zero() {
        let settings = SimulationSettings {
            interval_secs: -1.0,
            seed: None,
        };
        assert_eq!(settings.interval(), Duration::ZERO);
    }
}

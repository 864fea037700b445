//! # harvestwatch
//!
//! A terminal dashboard and library for a remote irrigation and
//! water-harvesting sensor system.
//!
//! Readings (soil moisture, tank level, solar voltage, pump state, climate)
//! arrive from a realtime database push feed, a local simulation, a file or
//! a network stream. Each reading is turned into display state (alerts, solar
//! efficiency, next irrigation, usage statistics) and appended to a 24-entry
//! rolling history that feeds the trend and solar charts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(derived) │    │(ratatui)│    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── Channel (feed) | Simulated | File | Stream  │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view switching, pump mode and export
//! - **[`source`]**: Data source abstraction ([`DataSource`] trait) with
//!   implementations for channels, simulation, file polling and TCP streams
//! - **[`data`]**: Derived metrics, the rolling [`History`] and usage stats
//! - **`feed`**: Realtime database push client (requires the `feed` feature)
//! - **[`config`]**: Layered settings from TOML and `HARVESTWATCH_*` variables
//! - **[`ui`]**: Terminal rendering - gauges, trend chart, solar bars, themes
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Follow a realtime database location
//! harvestwatch --database-url https://water-harvesting-default-rtdb.firebaseio.com
//!
//! # Run the built-in simulation
//! harvestwatch --simulate --interval 2
//!
//! # Watch a JSON file or a TCP stream of NDJSON readings
//! harvestwatch --file reading.json
//! harvestwatch --connect localhost:9090
//! ```
//!
//! ### As a library with a simulated source
//!
//! ```
//! use std::time::Duration;
//! use harvestwatch::{App, SimulatedSource, Thresholds};
//!
//! let source = Box::new(SimulatedSource::with_seed(Duration::from_secs(5), 42));
//! let mut app = App::new(source, Thresholds::default());
//! assert!(app.reload_data().unwrap());
//! assert!(app.dashboard.is_some());
//! ```
//!
//! ### As a library with stream source (TCP, etc.)
//!
//! ```no_run
//! use std::io::Cursor;
//! use harvestwatch::{App, StreamSource, Thresholds};
//!
//! # tokio_test::block_on(async {
//! let data = br#"{"soilMoisture":45,"waterLevel":75,"solarVoltage":2.8,"pumpStatus":0}"#;
//! let stream = Cursor::new(data.to_vec());
//! let source = StreamSource::spawn(stream, "example");
//! let app = App::new(Box::new(source), Thresholds::default());
//! # });
//! ```
//!
//! ### Pushing readings through a channel
//!
//! ```
//! use harvestwatch::{App, ChannelSource, FeedEvent, Reading, Thresholds};
//!
//! let (tx, source) = ChannelSource::create("controller");
//! let mut app = App::new(Box::new(source), Thresholds::default());
//!
//! tx.send(FeedEvent::Reading(Reading::new(45.0, 75.0, 2.8)));
//! app.reload_data().unwrap();
//! assert_eq!(app.dashboard.as_ref().unwrap().efficiency, 85);
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod source;
pub mod ui;

// Realtime database client (requires "feed" feature)
#[cfg(feature = "feed")]
pub mod feed;

// Re-export main types for convenience
pub use app::{App, View};
pub use config::Settings;
pub use data::{Alert, Dashboard, HealthStatus, History, Metric, PumpRuntime, Thresholds, UsageStats};
pub use source::{
    ChannelSender, ChannelSource, DataSource, FeedEvent, FileSource, Reading, SimulatedSource,
    StreamSource,
};

//! Data source abstraction for receiving sensor readings.
//!
//! This module provides a trait-based abstraction for receiving readings
//! from various sources (the realtime feed, a local simulation, files,
//! network streams, in-memory channels).

mod channel;
mod file;
mod reading;
mod simulated;
mod stream;

pub use channel::{ChannelSender, ChannelSource};
pub use file::FileSource;
pub use reading::Reading;
pub use simulated::{SimulatedSource, DEFAULT_INTERVAL};
pub use stream::StreamSource;

use std::fmt::Debug;

/// A single update delivered by a source.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// A new sensor reading.
    Reading(Reading),
    /// The feed delivered a null/absent payload.
    Missing,
}

impl FeedEvent {
    /// Interpret a JSON payload: `null` means missing, anything else must be
    /// a [`Reading`].
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            Ok(FeedEvent::Missing)
        } else {
            serde_json::from_value(value).map(FeedEvent::Reading)
        }
    }

    /// Parse a JSON document into an event.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        Self::from_value(serde_json::from_str(content)?)
    }
}

/// Trait for receiving sensor readings from various sources.
///
/// Implementations of this trait provide readings from different
/// backends - the realtime feed, a timer-driven simulation, file polling,
/// or in-memory channels.
///
/// # Example
///
/// ```
/// use harvestwatch::{DataSource, FeedEvent, SimulatedSource};
/// use std::time::Duration;
///
/// let mut source = SimulatedSource::with_seed(Duration::ZERO, 7);
/// if let Some(FeedEvent::Reading(reading)) = source.poll() {
///     println!("Soil moisture: {}%", reading.soil_moisture);
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest update.
    ///
    /// Returns `Some(event)` if new data is available, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<FeedEvent>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Check if the source has encountered an error.
    ///
    /// Returns the error message if the source is currently in an error state.
    fn error(&self) -> Option<String>;
}

//! Data models and processing for sensor readings.
//!
//! This module handles the transformation of raw readings into derived
//! display state and rolling history.
//!
//! ## Submodules
//!
//! - [`dashboard`]: Display state for the latest reading ([`Dashboard`])
//! - [`history`]: The 24-entry rolling window feeding the charts
//! - [`metrics`]: Pure derived metrics ([`Alert`], efficiency, next irrigation)
//! - [`timestamp`]: Epoch second/millisecond normalisation and time labels
//! - [`usage`]: Pump runtime accumulation and usage statistics
//!
//! ## Data Flow
//!
//! ```text
//! Reading (raw JSON)
//!        │
//!        ├──▶ Dashboard::from_reading()  (alert, efficiency, gauges)
//!        ├──▶ PumpRuntime::observe()     (usage statistics)
//!        └──▶ History::record()          (trend and solar charts)
//! ```

pub mod dashboard;
pub mod history;
pub mod metrics;
pub mod timestamp;
pub mod usage;

pub use dashboard::{Dashboard, Gauge};
pub use history::{History, HistoryEntry, Metric, HISTORY_CAPACITY, RECENT_WINDOW};
pub use metrics::{Alert, HealthStatus, Thresholds};
pub use usage::{PumpRuntime, UsageStats};

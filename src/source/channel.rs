//! Channel-based data source.
//!
//! Receives feed events via a tokio watch channel.
//! This is the bridge between the realtime feed client, which runs on a
//! tokio runtime, and the TUI loop, which polls.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use super::{DataSource, FeedEvent};

/// A data source that receives feed events via a channel.
///
/// The watch channel only keeps the latest value, so the TUI always sees the
/// most recent update.
///
/// # Example
///
/// ```
/// use harvestwatch::{ChannelSource, DataSource, FeedEvent, Reading};
///
/// let (tx, mut source) = ChannelSource::create("test");
/// tx.send(FeedEvent::Reading(Reading::new(45.0, 75.0, 2.8)));
/// assert!(source.poll().is_some());
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Option<FeedEvent>>,
    description: String,
    last_error: Arc<Mutex<Option<String>>>,
}

/// The producing half of a [`ChannelSource`].
#[derive(Debug, Clone)]
pub struct ChannelSender {
    sender: watch::Sender<Option<FeedEvent>>,
    last_error: Arc<Mutex<Option<String>>>,
}

impl ChannelSender {
    /// Publish an event. Returns `false` if the source has been dropped.
    pub fn send(&self, event: FeedEvent) -> bool {
        self.sender.send(Some(event)).is_ok()
    }

    /// Set or clear the error reported by the source.
    pub fn set_error(&self, error: Option<String>) {
        *self.last_error.lock() = error;
    }

    /// Returns true once the receiving source has been dropped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl ChannelSource {
    /// Create a channel pair for sending events to a ChannelSource.
    ///
    /// Returns (sender, source) where the sender can be used to push
    /// events and the source can be handed to the TUI.
    ///
    /// * `source_description` - where events come from
    ///   (e.g., "https://example.firebaseio.com/sensorData")
    pub fn create(source_description: &str) -> (ChannelSender, Self) {
        let (tx, rx) = watch::channel(None);
        let last_error = Arc::new(Mutex::new(None));
        let sender = ChannelSender {
            sender: tx,
            last_error: last_error.clone(),
        };
        let source = Self {
            receiver: rx,
            description: format!("channel: {}", source_description),
            last_error,
        };
        (sender, source)
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<FeedEvent> {
        // Check if there's a new value without blocking
        if self.receiver.has_changed().unwrap_or(false) {
            self.receiver.borrow_and_update().clone()
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}

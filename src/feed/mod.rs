//! Realtime database push client.
//!
//! Subscribes to one location of a Firebase-style realtime database over its
//! REST streaming API and forwards the current value to the TUI via a watch
//! channel.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐   text/event-stream   ┌──────────────────────┐
//! │ {database_url}/{path}    │──────────────────────▶│ SseDecoder           │
//! └──────────────────────────┘                       └──────────┬───────────┘
//!                                                               │ put / patch
//!                                                               ▼
//!                                                    ┌──────────────────────┐
//!                                                    │ FeedDocument (mirror)│
//!                                                    └──────────┬───────────┘
//!                                                               │ watch::Sender
//!                                                               ▼
//!                                                    ┌──────────────────────┐
//!                                                    │ ChannelSource (TUI)  │
//!                                                    └──────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```bash
//! harvestwatch --database-url https://water-harvesting-default-rtdb.firebaseio.com
//! ```

pub mod document;
pub mod error;
pub mod sse;

pub use document::{DatabaseEvent, FeedDocument};
pub use error::FeedError;
pub use sse::{SseDecoder, SseEvent};

use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::FeedSettings;
use crate::source::{ChannelSender, ChannelSource, FeedEvent};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The mirror of the subscribed location plus the last value handed to the
/// dashboard.
///
/// The mirror starts empty on every connection. The published value is kept
/// across connections, and an update that leaves it unchanged is not sent
/// again.
#[derive(Debug, Default)]
pub struct FeedState {
    document: FeedDocument,
    published: Option<FeedEvent>,
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the mirror before a new connection resends the location.
    pub fn reset_document(&mut self) {
        self.document = FeedDocument::new();
    }

    pub fn document(&self) -> &FeedDocument {
        &self.document
    }

    pub fn published(&self) -> Option<&FeedEvent> {
        self.published.as_ref()
    }
}

/// Location being watched, without credentials. Used in logs and the UI.
pub fn location(settings: &FeedSettings) -> Option<String> {
    let base = settings.database_url.as_deref()?.trim_end_matches('/');
    Some(format!("{}/{}", base, settings.path.trim_matches('/')))
}

/// Build the streaming REST URL for the configured location.
pub fn stream_url(settings: &FeedSettings) -> Result<String> {
    let location = location(settings).context("No database URL configured")?;
    let mut url = format!("{}.json", location);
    if let Some(auth) = &settings.auth {
        url.push_str("?auth=");
        url.push_str(auth);
    }
    Ok(url)
}

/// Start the push client.
///
/// Must be called from within a tokio runtime. Returns the source to hand to
/// the TUI and the handle of the background task, which runs until the
/// source is dropped or the server ends the subscription.
pub fn create_subscriber(settings: &FeedSettings) -> Result<(ChannelSource, JoinHandle<()>)> {
    let url = stream_url(settings)?;
    let location = location(settings).unwrap_or_default();

    let client = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let (sender, source) = ChannelSource::create(&format!("feed {}", location));
    let reconnect_delay = settings.reconnect_delay();

    info!("Subscribing to feed at {}", location);
    let handle = tokio::spawn(run(client, url, location, sender, reconnect_delay));

    Ok((source, handle))
}

async fn run(
    client: Client,
    url: String,
    location: String,
    sender: ChannelSender,
    reconnect_delay: Duration,
) {
    let mut state = FeedState::new();
    loop {
        state.reset_document();
        match stream_once(&client, &url, &location, &sender, &mut state).await {
            Ok(()) => {
                warn!("Feed stream for {} ended", location);
                sender.set_error(Some("Stream ended, reconnecting".to_string()));
            }
            Err(FeedError::Closed) => {
                info!("TUI receiver dropped, stopping feed client");
                return;
            }
            Err(e) if e.is_terminal() => {
                error!("Feed subscription for {} stopped: {}", location, e);
                sender.set_error(Some(e.to_string()));
                return;
            }
            Err(e) => {
                warn!("Feed error for {}: {}", location, e);
                sender.set_error(Some(format!("{}, reconnecting", e)));
            }
        }

        if sender.is_closed() {
            return;
        }
        debug!("Reconnecting in {:?}", reconnect_delay);
        tokio::time::sleep(reconnect_delay).await;
    }
}

async fn stream_once(
    client: &Client,
    url: &str,
    location: &str,
    sender: &ChannelSender,
    state: &mut FeedState,
) -> Result<(), FeedError> {
    let response = client
        .get(url)
        .header(ACCEPT, "text/event-stream")
        .send()
        .await?;

    if response.status() == StatusCode::UNAUTHORIZED {
        return Err(FeedError::Auth("Permission denied".to_string()));
    }

    if !response.status().is_success() {
        return Err(FeedError::Http(format!(
            "Server returned status {}",
            response.status()
        )));
    }

    info!("Connected to feed at {}", location);
    sender.set_error(None);

    let mut decoder = SseDecoder::new();
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        for event in decoder.feed(&chunk) {
            handle_event(state, &event, sender)?;
        }
    }

    Ok(())
}

/// Apply one server-sent event to the mirror and publish the result if it
/// differs from the last published value.
pub fn handle_event(
    state: &mut FeedState,
    event: &SseEvent,
    sender: &ChannelSender,
) -> Result<(), FeedError> {
    let Some(decoded) = DatabaseEvent::from_sse(event)? else {
        debug!("Ignoring event type '{}'", event.event);
        return Ok(());
    };

    match decoded {
        DatabaseEvent::KeepAlive => return Ok(()),
        DatabaseEvent::Cancel => return Err(FeedError::Cancelled),
        DatabaseEvent::AuthRevoked => return Err(FeedError::AuthRevoked),
        update => {
            state.document.apply(update);
        }
    }

    match state.document.to_event() {
        Ok(feed_event) => {
            if state.published.as_ref() == Some(&feed_event) {
                debug!("Location value unchanged");
                return Ok(());
            }
            if !sender.send(feed_event.clone()) {
                return Err(FeedError::Closed);
            }
            state.published = Some(feed_event);
        }
        // Wait for the rest of the fields to arrive
        Err(e) => debug!("Location does not hold a complete reading yet: {}", e),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{DataSource, Reading};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    const READING: &str = r#"{"path":"/","data":{"soilMoisture":45,"waterLevel":75,"solarVoltage":2.8,"pumpStatus":1}}"#;
    const DRIER_READING: &str = r#"{"path":"/","data":{"soilMoisture":30,"waterLevel":60,"solarVoltage":2.5,"pumpStatus":0}}"#;

    fn settings(url: &str) -> FeedSettings {
        FeedSettings {
            database_url: Some(url.to_string()),
            ..FeedSettings::default()
        }
    }

    fn sse(event: &str, data: &str) -> SseEvent {
        SseEvent {
            event: event.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn test_stream_url() {
        let url = stream_url(&settings("https://example.firebaseio.com/")).unwrap();
        assert_eq!(url, "https://example.firebaseio.com/sensorData.json");

        let mut with_auth = settings("https://example.firebaseio.com");
        with_auth.path = "/field/north/".to_string();
        with_auth.auth = Some("secret".to_string());
        assert_eq!(
            stream_url(&with_auth).unwrap(),
            "https://example.firebaseio.com/field/north.json?auth=secret"
        );
        assert_eq!(
            location(&with_auth).as_deref(),
            Some("https://example.firebaseio.com/field/north")
        );
    }

    #[test]
    fn test_stream_url_requires_database() {
        assert!(stream_url(&FeedSettings::default()).is_err());
        assert!(location(&FeedSettings::default()).is_none());
    }

    #[test]
    fn test_handle_put_publishes_reading() {
        let (tx, mut source) = ChannelSource::create("test");
        let mut state = FeedState::new();

        let event = sse(
            "put",
            r#"{"path":"/","data":{"soilMoisture":45,"waterLevel":75,"solarVoltage":2.8,"pumpStatus":0}}"#,
        );
        handle_event(&mut state, &event, &tx).unwrap();

        assert_eq!(
            source.poll(),
            Some(FeedEvent::Reading(Reading::new(45.0, 75.0, 2.8)))
        );
    }

    #[test]
    fn test_handle_patch_updates_reading() {
        let (tx, mut source) = ChannelSource::create("test");
        let mut state = FeedState::new();

        let put = sse(
            "put",
            r#"{"path":"/","data":{"soilMoisture":45,"waterLevel":75,"solarVoltage":2.8}}"#,
        );
        handle_event(&mut state, &put, &tx).unwrap();
        source.poll();

        let patch = sse("patch", r#"{"path":"/","data":{"waterLevel":12}}"#);
        handle_event(&mut state, &patch, &tx).unwrap();

        match source.poll() {
            Some(FeedEvent::Reading(reading)) => assert_eq!(reading.water_level, 12.0),
            other => panic!("expected a reading, got {:?}", other),
        }
    }

    #[test]
    fn test_handle_null_publishes_missing() {
        let (tx, mut source) = ChannelSource::create("test");
        let mut state = FeedState::new();

        handle_event(&mut state, &sse("put", r#"{"path":"/","data":null}"#), &tx).unwrap();
        assert_eq!(source.poll(), Some(FeedEvent::Missing));
    }

    #[test]
    fn test_handle_control_events() {
        let (tx, mut source) = ChannelSource::create("test");
        let mut state = FeedState::new();

        handle_event(&mut state, &sse("keep-alive", "null"), &tx).unwrap();
        assert!(source.poll().is_none());

        assert!(matches!(
            handle_event(&mut state, &sse("cancel", "null"), &tx),
            Err(FeedError::Cancelled)
        ));
        assert!(matches!(
            handle_event(&mut state, &sse("auth_revoked", "expired"), &tx),
            Err(FeedError::AuthRevoked)
        ));
    }

    #[test]
    fn test_handle_incomplete_reading_is_held_back() {
        let (tx, mut source) = ChannelSource::create("test");
        let mut state = FeedState::new();

        handle_event(
            &mut state,
            &sse("put", r#"{"path":"/soilMoisture","data":40}"#),
            &tx,
        )
        .unwrap();
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_unchanged_value_is_not_republished_after_reconnect() {
        let (tx, mut source) = ChannelSource::create("test");
        let mut state = FeedState::new();

        handle_event(&mut state, &sse("put", READING), &tx).unwrap();
        assert!(source.poll().is_some());

        state.reset_document();
        assert!(state.document().root().is_null());
        assert!(state.published().is_some());

        handle_event(&mut state, &sse("put", READING), &tx).unwrap();
        assert!(source.poll().is_none());

        handle_event(&mut state, &sse("put", DRIER_READING), &tx).unwrap();
        match source.poll() {
            Some(FeedEvent::Reading(reading)) => assert_eq!(reading.soil_moisture, 30.0),
            other => panic!("expected a reading, got {:?}", other),
        }
    }

    #[test]
    fn test_handle_event_after_receiver_dropped() {
        let (tx, source) = ChannelSource::create("test");
        drop(source);
        let mut state = FeedState::new();

        let result = handle_event(
            &mut state,
            &sse("put", r#"{"path":"/","data":null}"#),
            &tx,
        );
        assert!(matches!(result, Err(FeedError::Closed)));
    }

    fn event_stream(data: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\nevent: put\ndata: {}\n\n",
            data
        )
    }

    fn status(line: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            line
        )
    }

    /// Serve one scripted response per connection on a loopback port and hold
    /// the last connection open. Reports the index of each served connection.
    async fn serve(responses: Vec<String>) -> (String, mpsc::UnboundedReceiver<usize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/sensorData.json", listener.local_addr().unwrap());
        let (served_tx, served_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let last = responses.len() - 1;
            for (i, response) in responses.into_iter().enumerate() {
                let (mut socket, _) = listener.accept().await.unwrap();

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }

                socket.write_all(response.as_bytes()).await.unwrap();
                socket.flush().await.unwrap();
                let _ = served_tx.send(i);

                if i == last {
                    std::future::pending::<()>().await;
                }
            }
        });

        (url, served_rx)
    }

    fn spawn_client(url: String) -> (ChannelSource, JoinHandle<()>) {
        let client = Client::builder().no_proxy().build().unwrap();
        let (sender, source) = ChannelSource::create("test");
        let handle = tokio::spawn(run(client, url, "test".to_string(), sender, Duration::ZERO));
        (source, handle)
    }

    async fn next_reading(source: &mut ChannelSource) -> Reading {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(FeedEvent::Reading(reading)) = source.poll() {
                    return reading;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("no reading from the feed")
    }

    #[tokio::test]
    async fn test_run_reconnects_after_stream_ends() {
        let (url, _served) = serve(vec![
            event_stream(READING),
            event_stream(DRIER_READING),
        ])
        .await;
        let (mut source, handle) = spawn_client(url);

        let mut reading = next_reading(&mut source).await;
        if reading.soil_moisture == 45.0 {
            reading = next_reading(&mut source).await;
        }

        assert_eq!(reading.soil_moisture, 30.0);
        assert!(source.error().is_none());
        assert!(!handle.is_finished());
    }

    #[tokio::test]
    async fn test_run_skips_value_resent_on_reconnect() {
        let (url, mut served) = serve(vec![event_stream(READING), event_stream(READING)]).await;
        let (mut source, _handle) = spawn_client(url);

        assert_eq!(next_reading(&mut source).await.soil_moisture, 45.0);

        assert_eq!(served.recv().await, Some(0));
        assert_eq!(served.recv().await, Some(1));
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(source.poll().is_none());
        assert!(source.error().is_none());
    }

    #[tokio::test]
    async fn test_run_stops_on_unauthorized() {
        let (url, _served) = serve(vec![status("401 Unauthorized")]).await;
        let (source, handle) = spawn_client(url);

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("client kept running")
            .unwrap();

        let error = source.error().unwrap();
        assert!(error.contains("Permission denied"));
    }

    #[tokio::test]
    async fn test_run_retries_after_server_error() {
        let (url, _served) = serve(vec![
            status("503 Service Unavailable"),
            event_stream(READING),
        ])
        .await;
        let (mut source, handle) = spawn_client(url);

        assert_eq!(next_reading(&mut source).await.soil_moisture, 45.0);
        assert!(source.error().is_none());
        assert!(!handle.is_finished());
    }
}

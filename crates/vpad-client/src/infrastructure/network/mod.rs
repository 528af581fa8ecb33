//! Network infrastructure for the translator client.
//!
//! Keeps a WebSocket connection to the relay open and forwards every
//! received data frame to the application on an `mpsc` channel.
//!
//! - `RelayConnection` owns the connection settings.
//! - [`RelayConnection::start`] spawns the supervisor task: connect, read
//!   until the connection ends, report `Disconnected`, wait the reconnect
//!   delay, repeat, until the `running` flag is cleared.
//! - The translator never writes to the relay; keepalive pings from the relay
//!   are answered by the WebSocket layer.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use futures_util::StreamExt;
use thiserror::Error;
use tokio::{net::TcpStream, sync::mpsc, task::JoinHandle, time};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{client::IntoClientRequest, Error as WsError, Message as WsMessage},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};

/// Relay endpoint used when none is configured.
pub const DEFAULT_RELAY_URL: &str = "ws://localhost:5000/ws";

/// Delay between reconnect attempts when none is configured.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

const EVENT_QUEUE_DEPTH: usize = 128;

type RelayStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Errors that can occur in the client network layer.
#[derive(Debug, Error)]
pub enum ClientNetworkError {
    /// The configured URL is not a usable WebSocket URL.
    #[error("invalid relay URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    /// The WebSocket connection to the relay could not be established.
    #[error("failed to connect to relay at {url}: {source}")]
    ConnectFailed {
        url: String,
        #[source]
        source: WsError,
    },
}

/// Configuration for the relay connection.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayConnectionConfig {
    /// `ws://host:port/path` of the relay.
    pub url: String,
    /// Delay before reconnecting after the connection drops or fails.
    pub reconnect_interval: Duration,
}

impl Default for RelayConnectionConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RELAY_URL.to_string(),
            reconnect_interval: DEFAULT_RECONNECT_DELAY,
        }
    }
}

/// Checks that `url` is a plain `ws://` URL the WebSocket client can build a
/// request from.
///
/// The relay speaks plain HTTP and this client is built without TLS, so
/// `wss://` is rejected here instead of failing on every connect attempt.
///
/// # Errors
///
/// Returns [`ClientNetworkError::InvalidUrl`] describing the problem.
pub fn validate_relay_url(url: &str) -> Result<(), ClientNetworkError> {
    let invalid = |reason: String| ClientNetworkError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    if url.starts_with("wss://") {
        return Err(invalid(
            "wss:// is not supported; point the client at the relay's ws:// endpoint".to_string(),
        ));
    }
    if !url.starts_with("ws://") {
        return Err(invalid("scheme must be ws://".to_string()));
    }
    url.into_client_request()
        .map(|_| ())
        .map_err(|e| invalid(e.to_string()))
}

/// One data frame received from the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Text(String),
    Binary(Vec<u8>),
}

/// Events emitted by the network layer to the application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    /// The WebSocket connection was established.
    Connected { url: String },
    /// A frame was received from the relay.
    MessageReceived(InboundFrame),
    /// The connection was lost; a reconnect follows after the delay.
    Disconnected,
}

/// Manages the WebSocket connection from the translator to the relay.
pub struct RelayConnection {
    config: RelayConnectionConfig,
}

impl RelayConnection {
    pub fn new(config: RelayConnectionConfig) -> Self {
        Self { config }
    }

    /// Spawns the connect/read/reconnect loop.
    ///
    /// Returns the event receiver and the supervisor's task handle.  The loop
    /// ends when `running` is cleared (checked between connections) or when
    /// the receiver is dropped; abort the handle to stop it immediately.
    pub fn start(
        self: Arc<Self>,
        running: Arc<AtomicBool>,
    ) -> (mpsc::Receiver<NetworkEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);

        let handle = tokio::spawn(async move {
            while running.load(Ordering::Relaxed) {
                match self.connect().await {
                    Ok(ws) => {
                        info!("connected to relay at {}", self.config.url);
                        let connected = NetworkEvent::Connected {
                            url: self.config.url.clone(),
                        };
                        if tx.send(connected).await.is_err() {
                            break;
                        }

                        let receiver_alive = read_loop(ws, &tx).await;
                        if !receiver_alive || tx.send(NetworkEvent::Disconnected).await.is_err() {
                            break;
                        }
                        info!(
                            "disconnected from relay; reconnecting in {:?}",
                            self.config.reconnect_interval
                        );
                    }
                    Err(e) => {
                        warn!("{e}; retrying in {:?}", self.config.reconnect_interval);
                    }
                }

                if running.load(Ordering::Relaxed) {
                    time::sleep(self.config.reconnect_interval).await;
                }
            }
            debug!("relay connection supervisor stopped");
        });

        (rx, handle)
    }

    async fn connect(&self) -> Result<RelayStream, ClientNetworkError> {
        let (ws, _response) = connect_async(self.config.url.as_str())
            .await
            .map_err(|source| ClientNetworkError::ConnectFailed {
                url: self.config.url.clone(),
                source,
            })?;
        Ok(ws)
    }
}

/// Forwards data frames until the connection ends.
///
/// Returns `false` if the event receiver has been dropped.
async fn read_loop(mut ws: RelayStream, tx: &mpsc::Sender<NetworkEvent>) -> bool {
    while let Some(msg) = ws.next().await {
        let frame = match msg {
            Ok(WsMessage::Text(text)) => InboundFrame::Text(text),
            Ok(WsMessage::Binary(bytes)) => InboundFrame::Binary(bytes),
            Ok(WsMessage::Close(frame)) => {
                debug!("relay closed the connection: {frame:?}");
                break;
            }
            Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_)) => continue,
            Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => break,
            Err(e) => {
                warn!("relay read error: {e}");
                break;
            }
        };

        if tx.send(NetworkEvent::MessageReceived(frame)).await.is_err() {
            return false;
        }
    }
    true
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_points_at_local_relay() {
        // Arrange / Act
        let cfg = RelayConnectionConfig::default();

        // Assert
        assert_eq!(cfg.url, "ws://localhost:5000/ws");
        assert_eq!(cfg.reconnect_interval, Duration::from_secs(3));
    }

    #[test]
    fn test_validate_accepts_ws() {
        tokio_test::assert_ok!(validate_relay_url("ws://localhost:5000/ws"));
        tokio_test::assert_ok!(validate_relay_url("ws://192.168.1.20:5000/pad"));
    }

    #[test]
    fn test_validate_rejects_wss_without_tls_support() {
        // Act
        let err = tokio_test::assert_err!(validate_relay_url("wss://pad.example.org/ws"));

        // Assert
        assert!(matches!(err, ClientNetworkError::InvalidUrl { .. }));
        assert!(err.to_string().contains("wss://"));
    }

    #[test]
    fn test_validate_rejects_http_scheme() {
        let err = validate_relay_url("http://localhost:5000/ws").unwrap_err();
        assert!(matches!(err, ClientNetworkError::InvalidUrl { .. }));
    }

    #[test]
    fn test_validate_rejects_garbage() {
        tokio_test::assert_err!(validate_relay_url("ws://bad host/ws"));
    }

    #[tokio::test]
    async fn test_start_with_running_cleared_ends_without_events() {
        // Arrange
        let conn = Arc::new(RelayConnection::new(RelayConnectionConfig {
            url: "ws://127.0.0.1:1/ws".to_string(),
            reconnect_interval: Duration::from_secs(60),
        }));
        let running = Arc::new(AtomicBool::new(false));

        // Act
        let (mut rx, handle) = conn.start(running);
        handle.await.unwrap();

        // Assert: the sender was dropped without sending anything.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_retried_without_events() {
        // Arrange: nothing listens on port 1.
        let conn = Arc::new(RelayConnection::new(RelayConnectionConfig {
            url: "ws://127.0.0.1:1/ws".to_string(),
            reconnect_interval: Duration::from_millis(20),
        }));
        let running = Arc::new(AtomicBool::new(true));

        // Act
        let (mut rx, handle) = conn.start(Arc::clone(&running));
        let first = time::timeout(Duration::from_millis(200), rx.recv()).await;

        // Assert: still retrying, nothing reported.
        assert!(first.is_err(), "no event expected while the relay is down");
        assert!(!handle.is_finished());
        handle.abort();
    }
}

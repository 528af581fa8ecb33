//! WebSocket server: HTTP routing and per-peer task management.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Routing requests with an `axum` [`Router`]: the WebSocket path is
//!    upgraded and handed to the relay, `/` and `/index.html` get the entry
//!    page, everything else gets `404 Not Found`.
//! 3. Registering each upgraded session with the [`RelayHub`].
//! 4. Running two concurrent halves per peer:
//!    - **Reader**: every text/binary frame from the peer is broadcast to
//!      all other peers.
//!    - **Writer**: drains the peer's mailbox onto its socket and sends
//!      keepalive pings.
//! 5. Removing the peer from the hub when either half ends.
//! 6. Stopping the listener when the `running` flag is cleared.
//!
//! # Scalability
//!
//! Each peer runs in its own Tokio task; a slow peer only fills its own
//! mailbox.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        ConnectInfo, FromRef, State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::time::{interval, sleep};
use tracing::{debug, info, warn};

use crate::application::{DeliveryError, PeerId, PeerMailbox, RelayHub};
use crate::domain::{RelayConfig, RelayFrame, PAGE_PATHS};
use crate::infrastructure::http_page::{self, EntryPage};

type WsSink = SplitSink<WebSocket, WsMessage>;
type WsSource = SplitStream<WebSocket>;

/// How often the shutdown flag is polled.
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

/// Interval used for the writer's ticker when keepalive pings are disabled.
/// The tick branch is switched off in that case; this only keeps `interval`
/// away from a zero period.
const IDLE_TICK: Duration = Duration::from_secs(3600);

/// Shared state handed to every request handler.
#[derive(Debug, Clone)]
pub struct RelayState {
    pub hub: Arc<RelayHub>,
    pub config: Arc<RelayConfig>,
    pub page: EntryPage,
}

impl FromRef<RelayState> for EntryPage {
    fn from_ref(state: &RelayState) -> Self {
        state.page.clone()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Binds `config.bind_addr` and runs the relay until `running` is cleared.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound, the configuration is
/// invalid, or the configured page cannot be loaded.
pub async fn run_server(config: RelayConfig, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind relay listener on {}", config.bind_addr))?;

    info!(
        "relay listening on {} (WebSocket path {})",
        config.bind_addr, config.ws_path
    );

    let hub = Arc::new(RelayHub::new(config.queue_depth));
    serve(listener, Arc::new(config), hub, running).await
}

/// Serves the relay on an already-bound listener.
///
/// Split out from [`run_server`] so tests can bind an ephemeral port and keep
/// a handle on the hub.  Sessions that are already upgraded keep running
/// after this returns; the hub outlives the listener.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the configured page
/// cannot be loaded, or the server fails.
pub async fn serve(
    listener: TcpListener,
    config: Arc<RelayConfig>,
    hub: Arc<RelayHub>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    config.validate()?;
    let page = http_page::load_page(config.page.as_deref(), &config.ws_path).await?;

    let app = build_router(RelayState {
        hub,
        config,
        page: page.into(),
    });

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_requested(running))
    .await
    .context("relay server failed")?;

    Ok(())
}

/// Builds the relay's routes.
///
/// Methods other than `GET` on a known path fall through to 404 as well.
pub fn build_router(state: RelayState) -> Router {
    let ws_path = state.config.ws_path.clone();
    let mut router = Router::new().route(
        &ws_path,
        get(relay_upgrade).fallback(http_page::not_found),
    );
    for path in PAGE_PATHS.into_iter().filter(|path| *path != ws_path) {
        router = router.route(
            path,
            get(http_page::serve_page).fallback(http_page::not_found),
        );
    }
    router.fallback(http_page::not_found).with_state(state)
}

/// Resolves once `running` has been cleared.
async fn shutdown_requested(running: Arc<AtomicBool>) {
    while running.load(Ordering::Relaxed) {
        sleep(SHUTDOWN_POLL).await;
    }
    info!("shutdown flag set; stopping listener");
}

// ── Per-peer handling ─────────────────────────────────────────────────────────

/// `GET <ws_path>`: upgrades the connection and runs the peer.
async fn relay_upgrade(
    ws: WebSocketUpgrade,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
    State(state): State<RelayState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        match run_peer(socket, peer_addr, state).await {
            Ok(()) => info!("peer {peer_addr} closed normally"),
            Err(e) => warn!("peer {peer_addr} closed with error: {e:#}"),
        }
    })
}

/// Runs the complete lifecycle of one relay peer.
///
/// # Errors
///
/// Returns an error if the peer's stream fails with something other than a
/// normal close.
async fn run_peer(
    socket: WebSocket,
    peer_addr: SocketAddr,
    state: RelayState,
) -> anyhow::Result<()> {
    let hub = state.hub;
    let mailbox = hub.join().await;
    let peer_id = mailbox.id();
    info!(
        "peer {peer_id} joined from {peer_addr}; {} connected",
        hub.peer_count().await
    );

    let (ws_tx, ws_rx) = socket.split();
    let mut writer = tokio::spawn(write_outbound(ws_tx, mailbox, state.config.ping_interval));

    // The peer is done as soon as either half finishes.
    let result = tokio::select! {
        r = read_inbound(ws_rx, peer_id, &hub) => r,
        _ = &mut writer => {
            debug!("peer {peer_id}: writer ended");
            Ok(())
        }
    };

    hub.leave(peer_id).await;
    writer.abort();
    info!("peer {peer_id} left; {} connected", hub.peer_count().await);

    result
}

/// Reads frames from the peer and broadcasts each one to everybody else.
async fn read_inbound(mut ws_rx: WsSource, peer_id: PeerId, hub: &RelayHub) -> anyhow::Result<()> {
    while let Some(msg) = ws_rx.next().await {
        let frame = match msg {
            Ok(WsMessage::Text(text)) => RelayFrame::Text(text),
            Ok(WsMessage::Binary(bytes)) => RelayFrame::Binary(bytes),
            Ok(WsMessage::Close(_)) => {
                debug!("peer {peer_id}: Close frame received");
                break;
            }
            Ok(WsMessage::Ping(_) | WsMessage::Pong(_)) => continue,
            Err(e) => return Err(e).context("WebSocket read failed"),
        };

        let size = frame.len();
        let kind = frame.kind();
        let report = hub.broadcast(peer_id, frame).await;
        debug!(
            "peer {peer_id}: relayed {kind} frame ({size} bytes) to {} peer(s)",
            report.delivered
        );
        for failure in report.failures {
            match failure {
                DeliveryError::QueueFull(_) => warn!("{failure}"),
                DeliveryError::Disconnected(_) => debug!("{failure}"),
            }
        }
    }
    Ok(())
}

/// Drains the peer's mailbox onto its socket and sends keepalive pings.
async fn write_outbound(mut ws_tx: WsSink, mut mailbox: PeerMailbox, ping_interval: Option<Duration>) {
    let peer_id = mailbox.id();
    let mut ticker = interval(ping_interval.unwrap_or(IDLE_TICK));
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            frame = mailbox.recv() => {
                let Some(frame) = frame else {
                    debug!("peer {peer_id}: mailbox closed");
                    break;
                };
                if let Err(e) = ws_tx.send(to_ws_message(frame)).await {
                    debug!("peer {peer_id}: send failed: {e}");
                    break;
                }
            }
            _ = ticker.tick(), if ping_interval.is_some() => {
                if let Err(e) = ws_tx.send(WsMessage::Ping(Vec::new())).await {
                    debug!("peer {peer_id}: keepalive ping failed: {e}");
                    break;
                }
            }
        }
    }

    let _ = ws_tx.close().await;
}

fn to_ws_message(frame: RelayFrame) -> WsMessage {
    match frame {
        RelayFrame::Text(text) => WsMessage::Text(text),
        RelayFrame::Binary(bytes) => WsMessage::Binary(bytes),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

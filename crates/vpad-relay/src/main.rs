//! vpad relay: entry point.
//!
//! Serves the controller page and relays every WebSocket message from one
//! peer to all other connected peers.
//!
//! # Usage
//!
//! ```text
//! vpad-relay [OPTIONS]
//!
//! Options:
//!   --bind          <IP>    Listener address [default: 0.0.0.0]
//!   --port          <PORT>  Listener port [default: 5000]
//!   --ws-path       <PATH>  WebSocket upgrade path [default: /ws]
//!   --page          <FILE>  HTML file served at / [default: built-in]
//!   --queue-depth   <N>     Frames buffered per peer [default: 64]
//!   --ping-interval <SECS>  Keepalive ping interval, 0 disables [default: 20]
//! ```
//!
//! Every option can also be set through the environment variable shown in
//! `--help` (`VPAD_BIND`, `VPAD_PORT`, ...).  CLI args take precedence.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vpad_relay::domain::{check_ws_path, RelayConfig};
use vpad_relay::infrastructure::run_server;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// vpad WebSocket relay.
///
/// Forwards each message received from one peer to every other peer.
#[derive(Debug, Parser)]
#[command(
    name = "vpad-relay",
    about = "Broadcast relay between the vpad controller page and translator clients",
    version
)]
struct Cli {
    /// IP address to bind to.
    ///
    /// `0.0.0.0` accepts phones on the LAN; `127.0.0.1` only local browsers;
    /// `::` listens on IPv6.
    #[arg(long, default_value = "0.0.0.0", env = "VPAD_BIND")]
    bind: IpAddr,

    /// TCP port for both the page and the WebSocket endpoint.
    #[arg(long, default_value_t = 5000, env = "VPAD_PORT")]
    port: u16,

    /// Request path upgraded to the relay WebSocket.
    #[arg(long, default_value = "/ws", env = "VPAD_WS_PATH")]
    ws_path: String,

    /// HTML file served at `/` instead of the built-in page.
    #[arg(long, env = "VPAD_PAGE")]
    page: Option<PathBuf>,

    /// Outbound frames buffered per peer before frames for that peer are
    /// dropped.
    #[arg(long, default_value_t = 64, env = "VPAD_QUEUE_DEPTH")]
    queue_depth: usize,

    /// Seconds between keepalive pings to each peer.  `0` disables them.
    #[arg(long, default_value_t = 20, env = "VPAD_PING_INTERVAL")]
    ping_interval: u64,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`RelayConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--ws-path` is not an absolute literal path or
    /// collides with the entry page.
    fn into_relay_config(self) -> anyhow::Result<RelayConfig> {
        check_ws_path(&self.ws_path)?;
        let bind_addr = SocketAddr::new(self.bind, self.port);

        let ping_interval = match self.ping_interval {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(RelayConfig {
            bind_addr,
            ws_path: self.ws_path,
            page: self.page,
            queue_depth: self.queue_depth.max(1),
            ping_interval,
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_relay_config()?;

    info!(
        "vpad relay starting: http://{}/ (relay at {})",
        config.bind_addr, config.ws_path
    );

    // Cleared on Ctrl+C; the accept loop polls it every 200 ms.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_server(config, running).await?;

    info!("vpad relay stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

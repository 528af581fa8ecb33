//! vpad translator client: entry point.
//!
//! Connects to the relay, decodes each controller snapshot the browser page
//! broadcasts, and applies it to a virtual gamepad.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config() + CLI overrides
//!  └─ open_device()              -- uinput or dry-run
//!  └─ RelayConnection::start()   -- WebSocket reconnect loop
//!  └─ dispatch loop
//!       ├─ MessageReceived  -> StateTranslator
//!       ├─ Connected / Disconnected -> log
//!       └─ Ctrl+C           -> release everything and exit
//! ```
//!
//! # Usage
//!
//! ```text
//! vpad-client [OPTIONS]
//!
//! Options:
//!   --config          <FILE>   TOML config file
//!   --url             <URL>    Relay WebSocket URL [default: ws://localhost:5000/ws]
//!   --device          <KIND>   uinput | dry-run [default: uinput]
//!   --device-name     <NAME>   Name of the uinput device
//!   --reconnect-delay <SECS>   Delay between reconnect attempts [default: 3]
//! ```

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use vpad_client::application::{StateTranslator, TranslateError};
use vpad_client::infrastructure::{
    device::{open_device, DeviceKind},
    network::{validate_relay_url, InboundFrame, NetworkEvent, RelayConnection},
    storage::{load_config, ClientConfig},
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// vpad translator client.
///
/// Flags override the matching settings from `--config`.
#[derive(Debug, Parser)]
#[command(
    name = "vpad-client",
    about = "Drives a virtual gamepad from controller snapshots received through the vpad relay",
    version
)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, env = "VPAD_CONFIG")]
    config: Option<PathBuf>,

    /// Relay WebSocket URL, e.g. `ws://192.168.1.20:5000/ws`.
    #[arg(long, env = "VPAD_RELAY_URL")]
    url: Option<String>,

    /// Virtual device to drive.
    #[arg(long, value_enum, env = "VPAD_DEVICE")]
    device: Option<DeviceKind>,

    /// Name the uinput device is registered under.
    #[arg(long, env = "VPAD_DEVICE_NAME")]
    device_name: Option<String>,

    /// Seconds to wait before reconnecting to the relay.
    #[arg(long, env = "VPAD_RECONNECT_DELAY")]
    reconnect_delay: Option<u64>,
}

impl Cli {
    /// Loads the config file (if any) and applies the CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded, the reconnect
    /// delay is 0, or the resulting relay URL is invalid.
    fn into_client_config(self) -> anyhow::Result<ClientConfig> {
        let mut config =
            load_config(self.config.as_deref()).context("failed to load configuration")?;

        if let Some(url) = self.url {
            config.relay.url = url;
        }
        if let Some(kind) = self.device {
            config.device.kind = kind;
        }
        if let Some(name) = self.device_name {
            config.device.name = name;
        }
        if let Some(secs) = self.reconnect_delay {
            config.relay.reconnect_delay_secs = secs;
        }

        config.validate()?;
        validate_relay_url(&config.relay.url)?;
        Ok(config)
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

    let config = Cli::parse().into_client_config()?;

    info!(
        "vpad client starting: relay={}, device={}",
        config.relay.url, config.device.kind
    );

    let device = open_device(config.device.kind, &config.device.name)
        .with_context(|| format!("failed to open {} device", config.device.kind))?;
    let mut translator = StateTranslator::new(device);

    // Checked by the reconnect loop between connection attempts.
    let running = Arc::new(AtomicBool::new(true));
    let connection = Arc::new(RelayConnection::new(config.connection_config()));
    let (mut events, network_task) = Arc::clone(&connection).start(Arc::clone(&running));

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            signal = &mut shutdown => {
                match signal {
                    Ok(()) => info!("received Ctrl+C, shutting down"),
                    Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
                }
                break;
            }
            event = events.recv() => match event {
                Some(NetworkEvent::Connected { url }) => info!("relay connected at {url}"),
                Some(NetworkEvent::Disconnected) => {
                    warn!("relay connection lost; reconnect in progress");
                }
                Some(NetworkEvent::MessageReceived(frame)) => dispatch_frame(&mut translator, frame),
                None => break,
            }
        }
    }

    running.store(false, Ordering::Relaxed);
    network_task.abort();

    // Leave nothing held down on the way out.
    match translator.release_all() {
        Ok(()) => debug!("released all controls"),
        Err(e) => error!("failed to release held controls: {e}"),
    }

    info!("vpad client stopped");
    Ok(())
}

/// Applies one relayed frame and logs the outcome.
fn dispatch_frame(translator: &mut StateTranslator, frame: InboundFrame) {
    let result = match frame {
        InboundFrame::Text(text) => translator.handle_text(&text),
        InboundFrame::Binary(bytes) => translator.handle_bytes(&bytes),
    };
    match result {
        Ok(()) => {}
        Err(e @ TranslateError::Decode(_)) => warn!("{e}"),
        Err(e @ TranslateError::Device(_)) => error!("{e}"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use vpad_client::infrastructure::device::dry_run::DryRunGamepad;
    use vpad_core::{GamepadAction, GamepadButton};

    fn bare_cli() -> Cli {
        Cli {
            config: None,
            url: None,
            device: None,
            device_name: None,
            reconnect_delay: None,
        }
    }

    #[test]
    fn test_cli_parses_device_kind() {
        let cli = Cli::parse_from(["vpad-client", "--device", "dry-run"]);
        assert_eq!(cli.device, Some(DeviceKind::DryRun));
    }

    #[test]
    fn test_cli_rejects_unknown_device_kind() {
        assert!(Cli::try_parse_from(["vpad-client", "--device", "joystick"]).is_err());
    }

    #[test]
    fn test_into_client_config_without_flags_uses_defaults() {
        let config = bare_cli().into_client_config().unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_flags_override_config_file() {
        // Arrange
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[relay]\nurl = \"ws://10.0.0.2:5000/ws\"\nreconnect_delay_secs = 9\n[device]\nkind = \"uinput\""
        )
        .unwrap();
        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            url: Some("ws://10.0.0.3:6000/pad".to_string()),
            device: Some(DeviceKind::DryRun),
            ..bare_cli()
        };

        // Act
        let config = cli.into_client_config().unwrap();

        // Assert
        assert_eq!(config.relay.url, "ws://10.0.0.3:6000/pad");
        assert_eq!(config.device.kind, DeviceKind::DryRun);
        assert_eq!(
            config.connection_config().reconnect_interval,
            Duration::from_secs(9),
            "values without a flag come from the file"
        );
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let cli = Cli {
            url: Some("http://localhost:5000/ws".to_string()),
            ..bare_cli()
        };
        assert!(cli.into_client_config().is_err());
    }

    #[test]
    fn test_zero_reconnect_delay_flag_is_rejected() {
        // Arrange
        let cli = Cli::parse_from(["vpad-client", "--reconnect-delay", "0"]);

        // Act
        let err = cli.into_client_config().unwrap_err();

        // Assert
        assert!(err.to_string().contains("reconnect delay"));
    }

    #[test]
    fn test_zero_reconnect_delay_in_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[relay]\nreconnect_delay_secs = 0").unwrap();
        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            ..bare_cli()
        };
        assert!(cli.into_client_config().is_err());
    }

    #[test]
    fn test_wss_url_is_rejected_at_startup() {
        let cli = Cli::parse_from(["vpad-client", "--url", "wss://relay.example.org/ws"]);
        let err = cli.into_client_config().unwrap_err();
        assert!(format!("{err:#}").contains("wss://"));
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/definitely/not/here/vpad.toml")),
            ..bare_cli()
        };
        assert!(cli.into_client_config().is_err());
    }

    #[test]
    fn test_dispatch_frame_applies_text_and_skips_garbage() {
        // Arrange
        let pad = Arc::new(DryRunGamepad::new());
        let mut translator = StateTranslator::new(pad.clone());
        let snapshot = r#"{"leftStick":{"x":0,"y":0},"rightStick":{"x":0,"y":0},"L1":false,"R1":false,"L2":false,"R2":false,"faceButtons":["b"],"DPadButtons":[]}"#;

        // Act
        dispatch_frame(&mut translator, InboundFrame::Text("garbage".to_string()));
        dispatch_frame(&mut translator, InboundFrame::Binary(snapshot.as_bytes().to_vec()));

        // Assert
        assert_eq!(pad.frames().len(), 1);
        assert_eq!(
            pad.committed_edges(),
            vec![GamepadAction::Press(GamepadButton::FaceB)]
        );
    }
}

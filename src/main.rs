//! # Locomotion Bridge
//!
//! Forward a VR controller thumbstick to OSC locomotion inputs.
//!
//! Reads the left hand controller's stick, scales it by the configured
//! activation threshold and sends `/input/Vertical` and `/input/Horizontal`
//! to an OSC receiver.

use anyhow::{bail, Result};
use tracing::{error, info};

use locomotion_bridge::config::{Config, DEFAULT_CONFIG_PATH};
use locomotion_bridge::controller::acquisition::AcquisitionLoop;
use locomotion_bridge::controller::evdev_provider::EvdevProvider;
use locomotion_bridge::controller::provider::ControllerRole;
use locomotion_bridge::controller::shaper::Shaper;
use locomotion_bridge::sink::OscUdpSink;

/// Hand whose stick drives locomotion
const CONTROLLER_ROLE: ControllerRole = ControllerRole::LeftHand;

/// Main entry point for Locomotion Bridge
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load (or create) the config file
///    - Connect the OSC sink and open the controller provider
///
/// 2. **Main Loop**
///    - Wait for the controller, then poll, shape and send every sample
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Shutdown**
///    - Send a final zero pair so the receiver stops moving
///    - Exit non-zero if the controller disconnected
///
/// # Errors
///
/// Returns error if:
/// - The OSC socket cannot be set up
/// - The controller provider cannot be initialized
/// - The controller disconnects
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug cargo run --release
/// ```
///
/// Expected output:
/// ```text
/// INFO locomotion_bridge: Locomotion Bridge v0.1.0 starting...
/// INFO locomotion_bridge::config: Threshold value loaded: 0.75
/// INFO locomotion_bridge::sink: Connected to OSC receiver at 127.0.0.1:9000
/// INFO locomotion_bridge::controller::acquisition: left hand controller found at index 18
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("Locomotion Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::load_or_create(DEFAULT_CONFIG_PATH);

    let sink = OscUdpSink::connect(&config.osc_target()).await?;

    let provider = match EvdevProvider::open(&config.device_name) {
        Ok(provider) => provider,
        Err(e) => {
            error!("Failed to initialize controller provider: {}", e);
            return Err(e.into());
        }
    };

    let shaper = Shaper::with_policy(config.threshold, config.mode);
    let mut acquisition = AcquisitionLoop::new(provider, sink, shaper, CONTROLLER_ROLE);

    info!("Press Ctrl+C to exit");

    let disconnected = tokio::select! {
        _ = acquisition.run() => true,

        // Handle Ctrl+C for graceful shutdown
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            false
        }
    };

    acquisition.stop_movement().await;

    if disconnected {
        error!("{} hand controller disconnected, exiting", CONTROLLER_ROLE);
        bail!("{} hand controller disconnected", CONTROLLER_ROLE);
    }

    Ok(())
}

mod console;
mod sample_loop;
mod sink;

use anyhow::{Context, Result};
use sample_loop::SampleLoop;
use spacepoint_config::AppConfig;
use spacepoint_imu::hid::DeviceFilter;
use spacepoint_imu::SpacePointClient;
use spacepoint_input::pointer::PointerMapper;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "spacepoint_app=info,spacepoint_imu=info,spacepoint_input=info".into()
            }),
        )
        .init();

    info!("SpacePoint pointer controller starting");

    // Load config.
    let config = spacepoint_config::load_config().unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    info!(
        mode = ?config.pointer.mode,
        frequency_hz = config.sampling.frequency_hz,
        screen = ?config.screen,
        "Config loaded"
    );

    let period = config
        .sampling
        .period()
        .context("sampling.frequency_hz cannot drive the sample timer")?;

    let filter = DeviceFilter {
        vendor_id: config.device.vendor_id,
        product_id: config.device.product_id,
        raw_interface: config.device.raw_interface.clone(),
        quaternion_interface: config.device.quaternion_interface.clone(),
        read_timeout_ms: config.device.read_timeout_ms,
    };

    // Without the device there is nothing to run.
    let client = match SpacePointClient::connect(&filter) {
        Ok(client) => client,
        Err(e) => {
            warn!(?e, "Device not available, not starting");
            return Ok(());
        }
    };

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    if let Err(e) = console::spawn_zero_trigger(command_tx) {
        warn!(?e, "Console unavailable, zero trigger disabled");
    }

    let sample_loop = SampleLoop::new(
        client.sensor_frames(),
        client.quat_frames(),
        command_rx,
        sink::host_sink(config.screen),
        PointerMapper::new(config.pointer.clone(), config.screen),
        period,
    );

    info!("Device is running. Press Enter to set zero, Ctrl+C to stop");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(?e, "Could not listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    // Release both channels however the loop ended.
    let result = sample_loop.run(shutdown).await;
    client.shutdown().await;
    info!("Device stopped");

    let reason = result?;
    info!(?reason, "Sample loop ended");
    Ok(())
}

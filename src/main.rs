use std::time::Duration;

use aquabridge::bridge::TransportBridge;
use aquabridge::config::BridgeConfig;
use aquabridge::link::{RumqttcChannel, SerialPortChannel};
use aquabridge::session::{self, ConnectionState, SessionSettings};
use color_eyre::Result;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = BridgeConfig::load_or_create().await?;
    info!(
        broker = %config.broker.host,
        port = config.broker.port,
        serial = %config.serial.port,
        "Starting bridge"
    );

    let serial = SerialPortChannel::open(&config.serial)?;
    let mqtt = RumqttcChannel::new(&config.broker);

    let (state_tx, state_rx) = watch::channel(ConnectionState::default());
    let cancel = CancellationToken::new();

    let bridge = TransportBridge::new(
        Box::new(serial),
        Box::new(mqtt),
        state_rx,
        Duration::from_millis(config.timing.receive_debounce_ms),
        cancel.clone(),
    );

    let settings = SessionSettings {
        client_id: config.broker.client_id.clone(),
        reconnect_delay: Duration::from_secs(config.timing.reconnect_delay_secs),
    };

    let mut worker = tokio::spawn(session::run(bridge, settings, state_tx, cancel.clone()));

    // Exit on either signal: operator shutdown, or the worker dying on its
    // own (serial gone) so supervision can restart the whole process.
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
            cancel.cancel();
            worker.await?;
        }
        result = &mut worker => {
            result?;
            info!("Bridge worker exited, shutting down");
        }
    }

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

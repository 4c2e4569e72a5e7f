//! Error definitions for the bridge and its channels.

use thiserror::Error;

/// Errors surfaced by the serial and MQTT channel implementations.
///
/// These exist at the channel seams so the session manager and the tests can
/// observe faults; the bridge itself never propagates them outward. Every
/// fault ends in either a silent drop or a reconnect cycle.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The serial channel is gone and will not produce more data.
    #[error("Serial channel closed: {0}")]
    SerialClosed(String),

    /// Writing a line to the serial channel failed.
    #[error("Serial write error: {0}")]
    SerialWrite(String),

    /// The broker connection attempt was refused or timed out.
    #[error("Connect error: {0}")]
    Connect(String),

    /// A subscribe request could not be issued.
    #[error("Subscribe error: {0}")]
    Subscribe(String),

    /// A publish request could not be issued.
    #[error("Publish error: {0}")]
    Publish(String),

    /// The established broker connection was lost.
    #[error("Connection lost: {0}")]
    ConnectionLost(String),
}

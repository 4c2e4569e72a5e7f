//! Session manager with statum state machine for the broker link.
//!
//! Implements the connect / subscribe / service cycle that keeps the bridge
//! alive across broker and network outages.
//!
//! # State Machine
//!
//! ```text
//! Disconnected ──► Connecting ──► Connected
//!       ▲                             │
//!       └─────────────────────────────┘
//!            (transport loss, detected while servicing)
//! ```
//!
//! Connect failures never leave `Disconnected`: the machine waits a fixed
//! delay and retries forever, because the bridge runs unattended. Subscribing
//! is best-effort: each inbound topic gets exactly one independent attempt
//! per connect, and failures do not block the transition to `Connected`.
//! There is exactly one session machine per process and one logical thread
//! of control; the two bridge directions interleave turn-by-turn inside
//! `service`.

use std::time::Duration;

use statum::{machine, state};
use tokio::sync::watch;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::bridge::TransportBridge;
use crate::protocol::INBOUND_TOPICS;

use super::ConnectionState;

/// States for the broker session lifecycle using statum
#[state]
#[derive(Debug, Clone)]
pub enum SessionState {
    Disconnected, // No session; connect attempts ongoing
    Connecting,   // Session accepted, subscriptions being issued
    Connected,    // Servicing both bridge directions
}

/// Fixed parameters of the session.
#[derive(Clone, Debug)]
pub struct SessionSettings {
    /// Client identifier presented to the broker. A fixed string: two bridge
    /// instances with the same identifier will evict each other's sessions.
    pub client_id: String,

    /// Wait between failed connect attempts.
    pub reconnect_delay: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            client_id: "ESP8266Client".to_string(),
            reconnect_delay: Duration::from_secs(5),
        }
    }
}

/// Broker session machine with compile-time state safety via statum.
///
/// Owns the transport bridge (and through it both channels) and publishes
/// every state change on the watch channel that gates the bridge's outbound
/// direction.
#[machine]
pub struct Session<S: SessionState> {
    bridge: TransportBridge,
    settings: SessionSettings,
    state_tx: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
}

impl Session<Disconnected> {
    pub fn create(
        bridge: TransportBridge,
        settings: SessionSettings,
        state_tx: watch::Sender<ConnectionState>,
        cancel: CancellationToken,
    ) -> Self {
        state_tx.send_replace(ConnectionState::Disconnected);
        Self::new(bridge, settings, state_tx, cancel)
    }

    /// Attempts to connect until it succeeds or shutdown is requested.
    ///
    /// Fixed delay between attempts, no retry limit. Returns `None` only on
    /// shutdown.
    pub async fn establish(mut self) -> Option<Session<Connecting>> {
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }

            debug!(client_id = %self.settings.client_id, "Attempting broker connection");
            match self.bridge.mqtt.connect(&self.settings.client_id).await {
                Ok(()) => {
                    info!("Broker session accepted");
                    self.state_tx.send_replace(ConnectionState::Connecting);
                    return Some(self.transition());
                }
                Err(e) => {
                    warn!(
                        "Connect failed ({}), retrying in {:?}",
                        e, self.settings.reconnect_delay
                    );
                    tokio::select! {
                        _ = self.cancel.cancelled() => return None,
                        _ = sleep(self.settings.reconnect_delay) => {}
                    }
                }
            }
        }
    }
}

impl Session<Connecting> {
    /// Issues one subscription attempt per inbound topic, then transitions
    /// to `Connected` regardless of individual outcomes.
    pub async fn subscribe_all(mut self) -> Session<Connected> {
        for topic in INBOUND_TOPICS {
            match self.bridge.mqtt.subscribe(topic).await {
                Ok(()) => info!(topic, "Subscribed"),
                Err(e) => warn!(topic, "Subscription failed: {}", e),
            }
        }

        info!("Session established");
        self.state_tx.send_replace(ConnectionState::Connected);
        self.transition()
    }
}

impl Session<Connected> {
    /// Logs the bridge counters whenever the session ends, so an operator
    /// can see what moved during the connected stretch.
    fn log_status(&self) {
        let status = self.bridge.status();
        info!(
            published = status.messages_published,
            received = status.messages_received,
            dropped = status.frames_dropped,
            "Bridge status"
        );
    }

    /// Services both bridge directions until the session is lost or
    /// shutdown is requested.
    ///
    /// Returns the machine back in `Disconnected` on transport loss so the
    /// very next iteration of the outer loop begins a new connect attempt.
    /// Returns `None` on shutdown or when the serial channel is gone.
    pub async fn service(mut self) -> Option<Session<Disconnected>> {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    self.log_status();
                    return None;
                }

                line = self.bridge.serial.next_line() => match line {
                    Ok(line) => {
                        self.bridge.forward_serial(&line).await;
                    }
                    Err(e) => {
                        // The serial side has no recovery path at this
                        // layer; supervision restarts the device.
                        error!("Serial channel failed: {}", e);
                        self.log_status();
                        self.cancel.cancel();
                        return None;
                    }
                },

                event = self.bridge.mqtt.poll() => match event {
                    Ok(Some(msg)) => {
                        if let Err(e) = self.bridge.forward_inbound(&msg).await {
                            warn!("Forwarding inbound message failed: {}", e);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Broker connection lost: {}", e);
                        self.log_status();
                        self.state_tx.send_replace(ConnectionState::Disconnected);
                        return Some(self.transition());
                    }
                },
            }
        }
    }
}

/// Drives the session machine until shutdown.
///
/// This is the single control loop of the process: connect, subscribe,
/// service, and on transport loss start over.
pub async fn run(
    bridge: TransportBridge,
    settings: SessionSettings,
    state_tx: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
) {
    let mut session = Session::create(bridge, settings, state_tx, cancel);

    loop {
        let Some(connecting) = session.establish().await else {
            break;
        };
        let connected = connecting.subscribe_all().await;
        match connected.service().await {
            Some(next) => session = next,
            None => break,
        }
    }

    info!("Session worker stopped");
}

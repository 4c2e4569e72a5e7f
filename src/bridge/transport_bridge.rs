//! The bridge proper: forwarding logic for both directions.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::protocol::{encode_inbound, is_outbound, parse_line};
use crate::session::ConnectionState;

use super::channel::{InboundMessage, MqttChannel, SerialChannel};
use super::error::BridgeError;

/// What happened to one serial line on the serial to MQTT path.
///
/// Externally every non-`Published` case is a silent drop; the outcome exists
/// so the drop policy is observable from tests and counted in
/// [`BridgeStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// The frame was handed to the broker.
    Published,
    /// The line was not a send directive; nothing to forward.
    Ignored,
    /// The frame's topic is not in the outbound set.
    UnknownTopic,
    /// The session is not up; the frame was dropped, not queued.
    Disconnected,
    /// The publish call itself failed; the frame was dropped.
    PublishFailed,
}

/// Running counters for the bridge, logged by the session manager whenever
/// a connected stretch ends.
#[derive(Debug, Clone, Default)]
pub struct BridgeStatus {
    pub messages_published: usize,
    pub messages_received: usize,
    pub frames_dropped: usize,
    pub last_activity: Option<chrono::DateTime<chrono::Local>>,
}

impl BridgeStatus {
    fn touch(&mut self) {
        self.last_activity = Some(chrono::Local::now());
    }
}

/// Moves data between the serial channel and the broker.
///
/// Owns both channels; the session manager drives it and gates the MQTT side
/// through the session state watch channel.
pub struct TransportBridge {
    pub(crate) serial: Box<dyn SerialChannel>,
    pub(crate) mqtt: Box<dyn MqttChannel>,
    state_rx: watch::Receiver<ConnectionState>,
    debounce: Duration,
    cancel: CancellationToken,
    status: BridgeStatus,
}

impl TransportBridge {
    pub fn new(
        serial: Box<dyn SerialChannel>,
        mqtt: Box<dyn MqttChannel>,
        state_rx: watch::Receiver<ConnectionState>,
        debounce: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            serial,
            mqtt,
            state_rx,
            debounce,
            cancel,
            status: BridgeStatus::default(),
        }
    }

    pub fn status(&self) -> &BridgeStatus {
        &self.status
    }

    /// Serial to MQTT: parse one line, filter it, publish it.
    ///
    /// Never fails; every fault is a drop, reported in the returned outcome.
    pub async fn forward_serial(&mut self, line: &str) -> ForwardOutcome {
        let Some(frame) = parse_line(line) else {
            debug!("Ignoring non-directive serial line");
            return ForwardOutcome::Ignored;
        };

        if !is_outbound(&frame.topic) {
            debug!(topic = %frame.topic, "Dropping frame for unknown outbound topic");
            self.status.frames_dropped += 1;
            return ForwardOutcome::UnknownTopic;
        }

        if *self.state_rx.borrow() != ConnectionState::Connected {
            debug!(topic = %frame.topic, "Dropping frame while session is down");
            self.status.frames_dropped += 1;
            return ForwardOutcome::Disconnected;
        }

        match self.mqtt.publish(&frame.topic, frame.payload.as_bytes()).await {
            Ok(()) => {
                self.status.messages_published += 1;
                self.status.touch();
                ForwardOutcome::Published
            }
            Err(e) => {
                warn!("Publish failed, dropping frame: {}", e);
                self.status.frames_dropped += 1;
                ForwardOutcome::PublishFailed
            }
        }
    }

    /// MQTT to serial: format one inbound message as a board line.
    ///
    /// After writing, waits the configured debounce before returning so the
    /// board has time to consume the line. The wait ends early on shutdown.
    pub async fn forward_inbound(&mut self, msg: &InboundMessage) -> Result<(), BridgeError> {
        let line = encode_inbound(&msg.topic, &msg.payload_text());
        self.serial.write_line(&line).await?;
        self.status.messages_received += 1;
        self.status.touch();

        tokio::select! {
            _ = self.cancel.cancelled() => {}
            _ = sleep(self.debounce) => {}
        }
        Ok(())
    }
}

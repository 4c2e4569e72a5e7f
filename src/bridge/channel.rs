//! Abstract channels the bridge reads from and writes to.
//!
//! The real implementations live in [`crate::link`]; the integration tests
//! substitute fakes. Both traits are object safe so the bridge and session
//! manager can hold them as `Box<dyn ...>` without caring which side of the
//! seam they are on.

use async_trait::async_trait;

use super::error::BridgeError;

/// One message delivered by the broker on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl InboundMessage {
    /// The payload as text, with invalid UTF-8 replaced. The board-side
    /// protocol is text only, so lossy conversion is acceptable here.
    pub fn payload_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Line-oriented serial link to the control board.
#[async_trait]
pub trait SerialChannel: Send {
    /// Waits for the next complete line from the board, without its trailing
    /// newline. Overlong lines have already been dropped by the reassembly
    /// layer and are never returned here.
    async fn next_line(&mut self) -> Result<String, BridgeError>;

    /// Writes one line to the board. The implementation appends the newline.
    async fn write_line(&mut self, line: &str) -> Result<(), BridgeError>;
}

/// Connection-oriented MQTT link to the broker.
#[async_trait]
pub trait MqttChannel: Send {
    /// Attempts to establish a broker session with the given client
    /// identifier. Returns only once the session is confirmed or refused.
    async fn connect(&mut self, client_id: &str) -> Result<(), BridgeError>;

    /// Issues a subscription for one topic on the current session.
    async fn subscribe(&mut self, topic: &str) -> Result<(), BridgeError>;

    /// Publishes a payload on the current session, QoS 0.
    async fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), BridgeError>;

    /// Services the broker connection: processes keepalives and returns the
    /// next inbound message, if the event that completed carried one. An
    /// error here means the session is lost and must be re-established.
    async fn poll(&mut self) -> Result<Option<InboundMessage>, BridgeError>;
}

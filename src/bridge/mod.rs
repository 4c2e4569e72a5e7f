//! Transport bridge between the serial link and the MQTT broker.
//!
//! The bridge owns the two channels and moves data between them:
//!
//! ```text
//! control board ──UART──► LineReader ──► parse_line ──► is_outbound ──► publish
//!                                                          │
//!                                                       (drop)
//!
//! broker ──subscribe──► InboundMessage ──► encode_inbound ──► UART write
//!                                              │
//!                                        200 ms debounce
//! ```
//!
//! Both channels are injected as trait objects so the session manager and the
//! tests can drive the bridge against fakes. The serial to MQTT direction is
//! gated on the session state published by the session manager: while the
//! session is anything other than `Connected`, outbound frames are dropped
//! rather than queued. Every drop is an explicit [`ForwardOutcome`] so tests
//! can observe what happened, but no error ever leaves the bridge.

pub mod channel;
pub mod error;
pub mod line_reader;
pub mod transport_bridge;

pub use channel::{InboundMessage, MqttChannel, SerialChannel};
pub use error::BridgeError;
pub use line_reader::{LineEvent, LineReader};
pub use transport_bridge::{BridgeStatus, ForwardOutcome, TransportBridge};

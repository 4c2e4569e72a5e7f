//! Real channel implementations behind the bridge's channel traits:
//! a UART link to the control board and a rumqttc client for the broker.

pub mod mqtt;
pub mod serial;

pub use mqtt::RumqttcChannel;
pub use serial::SerialPortChannel;

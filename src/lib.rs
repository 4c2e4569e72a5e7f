//! # aquabridge
//!
//! Bidirectional bridge between the AcuaponicDuino control board (line
//! oriented UART protocol) and an MQTT broker.
//!
//! The board sends `S[<topic>]<<payload>>` lines; the bridge republishes them
//! on the board-assigned topics. Messages arriving on the subscribed command
//! and configuration topics go back to the board as
//! `R [<topic>] <<payload>>` lines.
//!
//! ## Module Architecture
//!
//! ```text
//! protocol/  - line format, topic sets        (pure, no I/O)
//! bridge/    - channel traits, forwarding, line reassembly
//! session/   - connect / subscribe / service state machine
//! link/      - serialport and rumqttc channel implementations
//! config     - TOML configuration with deployment defaults
//! ```
//!
//! The session manager owns the bridge, the bridge owns the two channels,
//! and everything runs on a single logical thread of control: the two
//! directions interleave turn-by-turn, and the only flow control is dropping
//! what cannot be forwarded right now.

pub mod bridge;
pub mod config;
pub mod link;
pub mod protocol;
pub mod session;

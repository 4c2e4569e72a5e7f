//! Broker session lifecycle.

pub mod session_manager;

pub use session_manager::{run, Session, SessionSettings};

/// Observable state of the broker session, published on a watch channel.
///
/// Owned and mutated exclusively by the session manager; the bridge and the
/// process wiring only read it.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

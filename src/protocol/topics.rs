//! Fixed topic sets agreed between the control board, the bridge and the
//! Node-RED side of the broker.
//!
//! The outbound set is the only filter on the serial to MQTT direction: a
//! frame whose topic is not listed here is dropped. The inbound set is what
//! the session manager subscribes to after every (re)connect.

/// Topics the bridge is permitted to publish to on behalf of the board.
pub const OUTBOUND_TOPICS: [&str; 13] = [
    "AcuaponicDuino/Ambiente/Temperatura",
    "AcuaponicDuino/Ambiente/Humedad",
    "AcuaponicDuino/Ambiente/Luz",
    "AcuaponicDuino/Flujo/Entrada",
    "AcuaponicDuino/Flujo/Salida",
    "AcuaponicDuino/Agua/TDS",
    "AcuaponicDuino/Agua/pH",
    "AcuaponicDuino/Agua/Temperatura",
    "AcuaponicDuino/Start/Flujo",
    "AcuaponicDuino/Start/Agua",
    "AcuaponicDuino/Start/Ambiental",
    "AcuaponicDuino/Start/TempAgua",
    "AcuaponicDuino/Config/Stop",
];

/// Topics the bridge subscribes to and forwards back to the board.
pub const INBOUND_TOPICS: [&str; 5] = [
    "AcuaponicDuino/Commands",
    "AcuaponicDuino/Config/Agua",
    "AcuaponicDuino/Config/Ambiente",
    "AcuaponicDuino/Config/Flujo",
    "AcuaponicDuino/Config/Temperatura",
];

/// Returns true iff `topic` exactly matches one of the outbound topics.
pub fn is_outbound(topic: &str) -> bool {
    OUTBOUND_TOPICS.contains(&topic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_outbound_topics_accepted() {
        for topic in OUTBOUND_TOPICS {
            assert!(is_outbound(topic), "expected outbound: {}", topic);
        }
    }

    #[test]
    fn unknown_topics_rejected() {
        assert!(!is_outbound(""));
        assert!(!is_outbound("Unknown/Topic"));
        assert!(!is_outbound("AcuaponicDuino"));
        assert!(!is_outbound("AcuaponicDuino/Agua"));
    }

    #[test]
    fn near_misses_rejected() {
        assert!(!is_outbound("AcuaponicDuino/Agua/pH "));
        assert!(!is_outbound(" AcuaponicDuino/Agua/pH"));
        assert!(!is_outbound("AcuaponicDuino/Agua/ph"));
        assert!(!is_outbound("AcuaponicDuino/Agua/pH/"));
    }

    #[test]
    fn inbound_topics_are_not_outbound() {
        for topic in INBOUND_TOPICS {
            assert!(!is_outbound(topic), "inbound must not publish: {}", topic);
        }
    }
}

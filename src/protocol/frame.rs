//! Parsing of send directives and encoding of received messages.
//!
//! A send directive starts with the sentinel `S`, carries the topic between
//! the first `[` and the first `]`, and the payload between the first `<` and
//! the first `>`. Anything else on the line is ignored. There is no escaping:
//! topics and payloads must not contain the delimiter characters themselves.

/// Sentinel marking a line from the control board as a send directive.
pub const SENTINEL: char = 'S';

/// One parsed `(topic, payload)` unit extracted from a serial line.
///
/// Frames are created per complete line and consumed immediately by the
/// forwarding step; nothing is retained between lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub topic: String,
    pub payload: String,
}

/// Parses one serial line (without trailing newline) into a [`Frame`].
///
/// Returns `None` for anything that is not a well-formed send directive:
/// empty lines, lines not starting with the sentinel, and lines missing
/// either delimiter pair. A malformed line is not an error, it simply yields
/// no frame.
pub fn parse_line(line: &str) -> Option<Frame> {
    if !line.starts_with(SENTINEL) {
        return None;
    }

    let topic_open = line.find('[')?;
    let topic_close = line.find(']')?;
    let payload_open = line.find('<')?;
    let payload_close = line.find('>')?;

    if topic_close < topic_open || payload_close < payload_open {
        return None;
    }

    Some(Frame {
        topic: line[topic_open + 1..topic_close].to_string(),
        payload: line[payload_open + 1..payload_close].to_string(),
    })
}

/// Encodes a message received from the broker as a line for the control
/// board: `R [<topic>] <<payload>>`. The serial channel appends the newline.
pub fn encode_inbound(topic: &str, payload: &str) -> String {
    format!("R [{}] <{}>", topic, payload)
}

//! Serial line protocol shared between the bridge and the control board.
//!
//! The control board speaks a tiny line-oriented protocol over UART:
//!
//! ```text
//! board -> bridge   S[<topic>]<<payload>>      (send directive)
//! bridge -> board   R [<topic>] <<payload>>    (received message)
//! ```
//!
//! `frame` handles the translation between lines and `(topic, payload)`
//! pairs, `topics` holds the fixed topic sets the board and broker agree on.

pub mod frame;
pub mod topics;

pub use frame::{encode_inbound, parse_line, Frame};
pub use topics::{is_outbound, INBOUND_TOPICS, OUTBOUND_TOPICS};

//! Reassembly of raw serial bytes into complete lines.

/// Result of pushing bytes into the [`LineReader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// A complete line, without its trailing newline (and without a `\r`
    /// immediately preceding it).
    Line(String),
    /// A line exceeded the configured bound and was discarded up to the next
    /// newline. Carries the number of bytes thrown away so far.
    Overlong(usize),
}

/// Buffers serial input and emits an event whenever a newline is seen.
///
/// A line longer than `max_line_bytes` is a protocol violation; the reader
/// drops it without crashing and resynchronizes on the next newline.
pub struct LineReader {
    buffer: Vec<u8>,
    max_line_bytes: usize,
    discarding: bool,
    discarded: usize,
}

impl LineReader {
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(max_line_bytes),
            max_line_bytes,
            discarding: false,
            discarded: 0,
        }
    }

    /// Pushes a chunk of bytes and returns the events it completed.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<LineEvent> {
        let mut events = Vec::new();

        for &b in bytes {
            if self.discarding {
                if b == b'\n' {
                    events.push(LineEvent::Overlong(self.discarded));
                    self.discarding = false;
                    self.discarded = 0;
                } else {
                    self.discarded += 1;
                }
                continue;
            }

            if b == b'\n' {
                if self.buffer.last() == Some(&b'\r') {
                    self.buffer.pop();
                }
                let line = String::from_utf8_lossy(&self.buffer).into_owned();
                self.buffer.clear();
                events.push(LineEvent::Line(line));
                continue;
            }

            if self.buffer.len() == self.max_line_bytes {
                // Bound hit: throw the partial line away and skip to the
                // next newline.
                self.discarded = self.buffer.len() + 1;
                self.buffer.clear();
                self.discarding = true;
                continue;
            }

            self.buffer.push(b);
        }

        events
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discarding = false;
        self.discarded = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_lines_on_newline() {
        let mut reader = LineReader::new(200);
        let events = reader.push(b"S[a]<1>\nS[b]<2>\n");
        assert_eq!(
            events,
            vec![
                LineEvent::Line("S[a]<1>".into()),
                LineEvent::Line("S[b]<2>".into()),
            ]
        );
    }

    #[test]
    fn reassembles_across_chunks() {
        let mut reader = LineReader::new(200);
        assert!(reader.push(b"S[a]<1").is_empty());
        let events = reader.push(b".5>\n");
        assert_eq!(events, vec![LineEvent::Line("S[a]<1.5>".into())]);
    }

    #[test]
    fn strips_carriage_return() {
        let mut reader = LineReader::new(200);
        let events = reader.push(b"S[a]<1>\r\n");
        assert_eq!(events, vec![LineEvent::Line("S[a]<1>".into())]);
    }

    #[test]
    fn overlong_line_is_dropped_and_reader_resyncs() {
        let mut reader = LineReader::new(8);
        let mut events = reader.push(b"0123456789abcdef\n");
        events.extend(reader.push(b"S[a]<1>\n"));
        assert_eq!(
            events,
            vec![
                LineEvent::Overlong(16),
                LineEvent::Line("S[a]<1>".into()),
            ]
        );
    }

    #[test]
    fn line_at_exact_bound_survives() {
        let mut reader = LineReader::new(7);
        let events = reader.push(b"S[a]<1>\n");
        assert_eq!(events, vec![LineEvent::Line("S[a]<1>".into())]);
    }
}

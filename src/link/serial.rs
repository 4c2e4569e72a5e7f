//! Serial channel backed by a real UART through the `serialport` crate.
//!
//! `serialport` is blocking, so the port is serviced by two plain threads: a
//! reader that reassembles lines and forwards them over a tokio channel, and
//! a writer that drains outgoing lines. The async side only ever touches the
//! channels. Both threads end when the port dies or the channel handles are
//! dropped; the read side surfaces that as a closed channel, which the
//! session manager treats as unrecoverable.

use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use color_eyre::{eyre::eyre, Result};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::bridge::{BridgeError, LineEvent, LineReader, SerialChannel};
use crate::config::SerialSettings;

const READ_TIMEOUT: Duration = Duration::from_millis(100);
const LINE_CHANNEL_CAPACITY: usize = 64;

pub struct SerialPortChannel {
    line_rx: mpsc::Receiver<String>,
    write_tx: std::sync::mpsc::Sender<String>,
}

impl SerialPortChannel {
    /// Opens the configured port (8N1) and spawns the reader and writer
    /// threads.
    pub fn open(settings: &SerialSettings) -> Result<Self> {
        let port = serialport::new(&settings.port, settings.baud_rate)
            .timeout(READ_TIMEOUT)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .open()
            .map_err(|e| eyre!("Failed to open serial port {}: {}", settings.port, e))?;

        let write_port = port
            .try_clone()
            .map_err(|e| eyre!("Failed to clone serial port handle: {}", e))?;

        let (line_tx, line_rx) = mpsc::channel(LINE_CHANNEL_CAPACITY);
        let (write_tx, write_rx) = std::sync::mpsc::channel::<String>();

        let max_line_bytes = settings.max_line_bytes;
        std::thread::spawn(move || read_loop(port, line_tx, max_line_bytes));
        std::thread::spawn(move || write_loop(write_port, write_rx));

        Ok(Self { line_rx, write_tx })
    }
}

fn read_loop(
    mut port: Box<dyn serialport::SerialPort>,
    line_tx: mpsc::Sender<String>,
    max_line_bytes: usize,
) {
    let mut reader = LineReader::new(max_line_bytes);
    let mut buf = [0u8; 256];

    loop {
        let n = match port.read(&mut buf) {
            Ok(0) => continue,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::TimedOut => continue,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                error!("Serial read failed: {}", e);
                break;
            }
        };

        for event in reader.push(&buf[..n]) {
            match event {
                LineEvent::Line(line) => {
                    if line_tx.blocking_send(line).is_err() {
                        // Receiver gone, the bridge is shutting down.
                        return;
                    }
                }
                LineEvent::Overlong(bytes) => {
                    warn!("Dropping overlong serial line ({} bytes)", bytes);
                }
            }
        }
    }
}

fn write_loop(
    mut port: Box<dyn serialport::SerialPort>,
    write_rx: std::sync::mpsc::Receiver<String>,
) {
    while let Ok(line) = write_rx.recv() {
        if let Err(e) = port
            .write_all(line.as_bytes())
            .and_then(|_| port.write_all(b"\n"))
            .and_then(|_| port.flush())
        {
            error!("Serial write failed: {}", e);
            break;
        }
        debug!(len = line.len(), "Wrote line to board");
    }
}

#[async_trait::async_trait]
impl SerialChannel for SerialPortChannel {
    async fn next_line(&mut self) -> Result<String, BridgeError> {
        self.line_rx
            .recv()
            .await
            .ok_or_else(|| BridgeError::SerialClosed("reader thread ended".to_string()))
    }

    async fn write_line(&mut self, line: &str) -> Result<(), BridgeError> {
        self.write_tx
            .send(line.to_string())
            .map_err(|_| BridgeError::SerialWrite("writer thread ended".to_string()))
    }
}

use std::{
    io::{BufRead, BufReader, Read},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::Sender,
        Arc,
    },
    time::Duration,
};

use osprey_telemetry::{LineDecoder, Protocol, TelemetryState};
use parking_lot::RwLock;
use tracing::{debug, info, trace, warn};

mod controller;
mod error;
mod registry;

pub use controller::LinkReader;
pub use error::LinkError;

use self::{error::TransportError, registry::PortClaim};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connected,
    Disconnected,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkConfig {
    pub baud_rate: u32,
    /// Upper bound on how long `stop` waits for a blocked read.
    pub read_timeout: Duration,
    pub protocol: Protocol,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            read_timeout: Duration::from_millis(100),
            protocol: Protocol::default(),
        }
    }
}

/// Names of the serial ports currently present on the system.
pub fn available_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|port| port.port_name).collect(),
        Err(error) => {
            warn!(%error, "failed to enumerate serial ports");

            Vec::new()
        }
    }
}

struct LinkWorker {
    port_name: Arc<str>,
    decoder: LineDecoder,
    telemetry: Arc<TelemetryState>,
    stop: Arc<AtomicBool>,
    state: Arc<RwLock<LinkState>>,
    error_tx: Sender<LinkError>,
    on_update: Box<dyn Fn() + Send>,

    // Dropped after the device handle, see `run`.
    _claim: Option<PortClaim>,
}

/// Longest line kept while waiting for its `\n`; anything longer is noise.
const MAX_LINE_LEN: usize = 1024;

impl LinkWorker {
    fn run(self, reader: impl Read) {
        let mut reader = BufReader::new(reader);

        let outcome = self.pump(&mut reader);

        // Release the device before anyone can observe the reader as finished.
        drop(reader);

        match outcome {
            Ok(()) => {
                info!(port = %self.port_name, "link reader stopped");

                *self.state.write() = LinkState::Stopped;
            }
            Err(error) => {
                warn!(port = %self.port_name, %error, "link reader terminated");

                // Queued before the state flips so `Disconnected` always has an error to take.
                // The owner may already be gone during shutdown.
                let _ = self.error_tx.send(error);
                *self.state.write() = LinkState::Disconnected;
            }
        }

        self.update();
    }

    fn pump(&self, reader: &mut impl BufRead) -> Result<(), LinkError> {
        let mut line_buffer = Vec::new();
        let mut overlong = false;

        loop {
            if self.stop.load(Ordering::SeqCst) {
                return Ok(());
            }

            match read_chunk(reader, &mut line_buffer) {
                Ok(Chunk::Line) => {
                    // The tail of an overlong line was already counted.
                    if !overlong {
                        self.handle_line(&line_buffer);
                    }

                    overlong = false;
                    line_buffer.clear();
                }
                Ok(Chunk::Partial) => {}
                Ok(Chunk::Overflow) => {
                    if !overlong {
                        warn!(port = %self.port_name, "discarding line longer than {MAX_LINE_LEN} bytes");
                        self.telemetry.record_discard();
                    }

                    overlong = true;
                    line_buffer.clear();
                }
                Ok(Chunk::End) => {
                    info!(port = %self.port_name, "serial port reached end of stream");

                    return Err(LinkError::Disconnected);
                }
                Err(TransportError::TimedOut) => {}
                Err(TransportError::Disconnected(error)) => {
                    debug!(?error, "serial read failed");

                    return Err(LinkError::Disconnected);
                }
            }
        }
    }

    fn handle_line(&self, bytes: &[u8]) {
        let line = match std::str::from_utf8(bytes) {
            Ok(line) => line.trim_end_matches(['\r', '\n']),
            Err(error) => {
                debug!(?bytes, %error, "discarding line that is not UTF-8");
                self.telemetry.record_discard();

                return;
            }
        };

        trace!(%line, "received line");

        match self.decoder.decode(line) {
            Some(field) => {
                self.telemetry.apply(field);
                self.update();
            }
            None => self.telemetry.record_discard(),
        }
    }

    fn update(&self) {
        (self.on_update)()
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Chunk {
    /// `buffer` holds a complete line.
    Line,
    /// More bytes are needed to finish the line.
    Partial,
    /// The unfinished line grew past `MAX_LINE_LEN`.
    Overflow,
    End,
}

/// Moves at most one buffered read worth of bytes into `buffer`, stopping after a `\n`.
///
/// Bytes read before a timeout stay in `buffer` so a line split across reads is
/// completed by a later call. A trailing unterminated line is returned as a
/// `Line` before the stream reports `End`.
fn read_chunk(reader: &mut impl BufRead, buffer: &mut Vec<u8>) -> Result<Chunk, TransportError> {
    let available = reader.fill_buf()?;

    if available.is_empty() {
        return Ok(if buffer.is_empty() {
            Chunk::End
        } else {
            Chunk::Line
        });
    }

    let (taken, chunk) = match available.iter().position(|&byte| byte == b'\n') {
        Some(newline) => (newline + 1, Chunk::Line),
        None => (available.len(), Chunk::Partial),
    };

    buffer.extend_from_slice(&available[..taken]);
    reader.consume(taken);

    if chunk == Chunk::Partial && buffer.len() > MAX_LINE_LEN {
        return Ok(Chunk::Overflow);
    }

    Ok(chunk)
}

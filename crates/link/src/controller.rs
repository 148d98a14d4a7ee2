use std::{
    io::Read,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{channel, Receiver},
        Arc,
    },
    thread::{self, JoinHandle},
};

use osprey_telemetry::{LineDecoder, TelemetryState};
use parking_lot::RwLock;
use tracing::{error, info};

use super::{registry::PortClaim, LinkConfig, LinkError, LinkState, LinkWorker};

/// Owning handle of one serial link and the thread reading it.
///
/// Stopping is synchronous: once [`LinkReader::stop`] returns the reader thread
/// has exited and the device is closed, so the same port can be opened again.
pub struct LinkReader {
    port_name: Arc<str>,

    state: Arc<RwLock<LinkState>>,
    stop: Arc<AtomicBool>,
    error_rx: Receiver<LinkError>,

    handle: Option<JoinHandle<()>>,
}

impl LinkReader {
    pub fn open(
        port_name: &str,
        config: LinkConfig,
        telemetry: Arc<TelemetryState>,
        on_update: impl Fn() + Send + 'static,
    ) -> Result<LinkReader, LinkError> {
        let port_name: Arc<str> = Arc::from(port_name);

        let claim = PortClaim::acquire(&port_name)?;

        let port = serialport::new(port_name.as_ref(), config.baud_rate)
            .timeout(config.read_timeout)
            .open()
            .map_err(LinkError::from)?;

        info!(port = %port_name, baud_rate = config.baud_rate, protocol = %config.protocol, "serial port opened");

        Ok(Self::start(
            port_name,
            port,
            Some(claim),
            LineDecoder::new(config.protocol),
            telemetry,
            Box::new(on_update),
        ))
    }

    /// Runs the reader over an arbitrary byte source.
    ///
    /// The source must time out its reads (`io::ErrorKind::TimedOut`) when idle,
    /// otherwise `stop` can block indefinitely.
    pub fn spawn(
        name: &str,
        source: impl Read + Send + 'static,
        decoder: LineDecoder,
        telemetry: Arc<TelemetryState>,
        on_update: impl Fn() + Send + 'static,
    ) -> LinkReader {
        Self::start(
            Arc::from(name),
            source,
            None,
            decoder,
            telemetry,
            Box::new(on_update),
        )
    }

    fn start(
        port_name: Arc<str>,
        source: impl Read + Send + 'static,
        claim: Option<PortClaim>,
        decoder: LineDecoder,
        telemetry: Arc<TelemetryState>,
        on_update: Box<dyn Fn() + Send>,
    ) -> LinkReader {
        let (error_tx, error_rx) = channel();

        let state = Arc::new(RwLock::new(LinkState::Connected));
        let stop = Arc::new(AtomicBool::new(false));

        let handle = thread::Builder::new()
            .name("link_reader".into())
            .spawn({
                let state = Arc::clone(&state);
                let stop = Arc::clone(&stop);
                let port_name = Arc::clone(&port_name);

                move || {
                    LinkWorker {
                        port_name,
                        decoder,
                        telemetry,
                        stop,
                        state,
                        error_tx,
                        on_update,

                        _claim: claim,
                    }
                    .run(source)
                }
            })
            .expect("failed to spawn link reader thread");

        Self {
            port_name,

            state,
            stop,
            error_rx,

            handle: Some(handle),
        }
    }

    /// Signals the reader to exit and waits until it has.
    ///
    /// Returns within one read timeout. Stopping twice is a no-op.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        self.stop.store(true, Ordering::SeqCst);

        if handle.join().is_err() {
            error!(port = %self.port_name, "link reader thread panicked");

            *self.state.write() = LinkState::Stopped;
        }
    }

    pub fn state(&self) -> LinkState {
        *self.state.read()
    }

    pub fn is_running(&self) -> bool {
        self.state() == LinkState::Connected
    }

    /// The error that ended the reader, handed out once.
    pub fn take_error(&self) -> Option<LinkError> {
        self.error_rx.try_recv().ok()
    }

    pub fn port_name(&self) -> &str {
        self.port_name.as_ref()
    }
}

impl Drop for LinkReader {
    fn drop(&mut self) {
        self.stop();
    }
}

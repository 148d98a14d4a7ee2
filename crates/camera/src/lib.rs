use std::{
    io,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        mpsc::Sender,
        Arc,
    },
    time::Instant,
};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, trace, warn};

mod error;
pub mod format;
#[cfg(feature = "native-camera")]
mod native;
mod pump;

pub use error::CameraError;
pub use format::{Frame, PixelFormat, RawFrame};
pub use pump::FramePump;

use self::error::CaptureError;

/// A camera the pump can pull frames from.
///
/// `capture` blocks for at most a bounded time; when no frame is ready it should
/// fail with `io::ErrorKind::TimedOut` so the pump can observe a stop request.
/// A frame that arrived but could not be decoded is reported as
/// `io::ErrorKind::InvalidData` and skipped, unless nothing else arrives for a
/// long run of frames. Any other error ends the pump.
pub trait CaptureDevice {
    fn capture(&mut self) -> io::Result<RawFrame>;
}

impl<D: CaptureDevice + ?Sized> CaptureDevice for Box<D> {
    fn capture(&mut self) -> io::Result<RawFrame> {
        (**self).capture()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Capturing,
    Disconnected,
    Stopped,
}

/// Single-slot hand-off: a newer frame replaces an unconsumed older one.
#[derive(Debug, Default)]
struct FrameSlot {
    frame: Mutex<Option<Frame>>,
    dropped: AtomicU64,
}

impl FrameSlot {
    fn put(&self, frame: Frame) {
        if let Some(stale) = self.frame.lock().replace(frame) {
            trace!(sequence = stale.sequence, "dropping unconsumed camera frame");

            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn take(&self) -> Option<Frame> {
        self.frame.lock().take()
    }
}

/// Consecutive corrupt frames after which the device is treated as gone.
const MAX_CORRUPT_RUN: u32 = 30;

struct CaptureWorker {
    device_index: u32,
    stop: Arc<AtomicBool>,
    state: Arc<RwLock<CameraState>>,
    slot: Arc<FrameSlot>,
    error_tx: Sender<CameraError>,
    on_frame: Box<dyn Fn() + Send>,
}

impl CaptureWorker {
    fn run(self, mut device: impl CaptureDevice) {
        let outcome = self.pump(&mut device);

        drop(device);

        match outcome {
            Ok(()) => {
                info!(device = self.device_index, "camera capture stopped");

                *self.state.write() = CameraState::Stopped;
            }
            Err(error) => {
                warn!(device = self.device_index, %error, "camera capture terminated");

                // Queued before the state flips so `Disconnected` always has an error to take.
                let _ = self.error_tx.send(error);
                *self.state.write() = CameraState::Disconnected;
            }
        }

        (self.on_frame)();
    }

    fn pump(&self, device: &mut impl CaptureDevice) -> Result<(), CameraError> {
        let mut sequence = 0;
        let mut corrupt_run = 0;

        loop {
            if self.stop.load(Ordering::SeqCst) {
                return Ok(());
            }

            let raw = match device.capture().map_err(CaptureError::from) {
                Ok(raw) => {
                    corrupt_run = 0;

                    raw
                }
                Err(CaptureError::TimedOut) => continue,
                Err(CaptureError::Corrupt(error)) => {
                    corrupt_run += 1;

                    if corrupt_run >= MAX_CORRUPT_RUN {
                        warn!(device = self.device_index, %error, "camera delivers nothing but corrupt frames");

                        return Err(CameraError::Disconnected);
                    }

                    warn!(device = self.device_index, %error, "skipping corrupt camera frame");

                    continue;
                }
                Err(CaptureError::Lost(error)) => {
                    debug!(?error, "camera read failed");

                    return Err(CameraError::Disconnected);
                }
            };

            match format::to_rgb(&raw) {
                Ok(rgb) => {
                    sequence += 1;

                    self.slot.put(Frame {
                        width: raw.width,
                        height: raw.height,
                        rgb,
                        captured_at: Instant::now(),
                        sequence,
                    });

                    (self.on_frame)();
                }
                Err(error) => {
                    warn!(%error, format = ?raw.format, "discarding malformed camera frame");
                }
            }
        }
    }
}

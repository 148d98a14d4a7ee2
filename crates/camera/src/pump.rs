use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{channel, sync_channel, Receiver},
        Arc,
    },
    thread::{self, JoinHandle},
};

use parking_lot::RwLock;
use tracing::{error, info};

use super::{CameraError, CameraState, CaptureDevice, CaptureWorker, Frame, FrameSlot};

/// Owning handle of one camera and its capture thread.
pub struct FramePump {
    device_index: u32,

    state: Arc<RwLock<CameraState>>,
    stop: Arc<AtomicBool>,
    slot: Arc<FrameSlot>,
    error_rx: Receiver<CameraError>,

    handle: Option<JoinHandle<()>>,
}

impl FramePump {
    /// Opens the device on the capture thread and waits for the outcome.
    ///
    /// The device is created, used and dropped on that thread only.
    pub fn open<D, F>(
        device_index: u32,
        open_device: F,
        on_frame: impl Fn() + Send + 'static,
    ) -> Result<FramePump, CameraError>
    where
        D: CaptureDevice + 'static,
        F: FnOnce(u32) -> Result<D, CameraError> + Send + 'static,
    {
        let (ready_tx, ready_rx) = sync_channel(1);
        let (error_tx, error_rx) = channel();

        let state = Arc::new(RwLock::new(CameraState::Capturing));
        let stop = Arc::new(AtomicBool::new(false));
        let slot = Arc::new(FrameSlot::default());

        let handle = thread::Builder::new()
            .name("frame_pump".into())
            .spawn({
                let state = Arc::clone(&state);
                let stop = Arc::clone(&stop);
                let slot = Arc::clone(&slot);

                move || {
                    let device = match open_device(device_index) {
                        Ok(device) => {
                            let _ = ready_tx.send(Ok(()));

                            device
                        }
                        Err(error) => {
                            let _ = ready_tx.send(Err(error));

                            return;
                        }
                    };

                    CaptureWorker {
                        device_index,
                        stop,
                        state,
                        slot,
                        error_tx,
                        on_frame: Box::new(on_frame),
                    }
                    .run(device)
                }
            })
            .expect("failed to spawn frame pump thread");

        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!(device = device_index, "camera opened");

                Ok(Self {
                    device_index,

                    state,
                    stop,
                    slot,
                    error_rx,

                    handle: Some(handle),
                })
            }
            Ok(Err(error)) => {
                let _ = handle.join();

                Err(error)
            }
            Err(_) => {
                error!(device = device_index, "camera thread exited while opening");
                let _ = handle.join();

                Err(CameraError::Disconnected)
            }
        }
    }

    #[cfg(feature = "native-camera")]
    pub fn open_native(
        device_index: u32,
        on_frame: impl Fn() + Send + 'static,
    ) -> Result<FramePump, CameraError> {
        Self::open(device_index, super::native::NativeCamera::open, on_frame)
    }

    #[cfg(not(feature = "native-camera"))]
    pub fn open_native(
        _device_index: u32,
        _on_frame: impl Fn() + Send + 'static,
    ) -> Result<FramePump, CameraError> {
        Err(CameraError::Unsupported)
    }

    /// Signals the capture loop to exit and waits until the device is released.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        self.stop.store(true, Ordering::SeqCst);

        if handle.join().is_err() {
            error!(device = self.device_index, "frame pump thread panicked");

            *self.state.write() = CameraState::Stopped;
        }
    }

    /// The newest frame not yet handed out, if any.
    pub fn latest_frame(&self) -> Option<Frame> {
        self.slot.take()
    }

    /// Frames replaced before the consumer picked them up.
    pub fn dropped_frames(&self) -> u64 {
        self.slot.dropped.load(Ordering::Relaxed)
    }

    pub fn state(&self) -> CameraState {
        *self.state.read()
    }

    pub fn take_error(&self) -> Option<CameraError> {
        self.error_rx.try_recv().ok()
    }

    pub fn device_index(&self) -> u32 {
        self.device_index
    }
}

impl Drop for FramePump {
    fn drop(&mut self) {
        self.stop();
    }
}

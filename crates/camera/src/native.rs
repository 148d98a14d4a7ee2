use std::io;

use nokhwa::{
    pixel_format::RgbFormat,
    utils::{CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType},
    Camera, NokhwaError,
};
use tracing::debug;

use crate::{CameraError, CaptureDevice, PixelFormat, RawFrame};

pub(crate) struct NativeCamera {
    camera: Camera,
}

impl NativeCamera {
    pub(crate) fn open(device_index: u32) -> Result<Self, CameraError> {
        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);

        let mut camera =
            Camera::new(CameraIndex::Index(device_index), format).map_err(classify_open)?;
        camera.open_stream().map_err(classify_open)?;

        debug!(format = ?camera.camera_format(), "camera stream opened");

        Ok(Self { camera })
    }
}

impl CaptureDevice for NativeCamera {
    fn capture(&mut self) -> io::Result<RawFrame> {
        let buffer = self.camera.frame().map_err(|error| match error {
            // Per-frame read glitches; a vanished device shows up as a run of these.
            NokhwaError::ReadFrameError(_) => io::Error::new(io::ErrorKind::InvalidData, error),
            _ => io::Error::other(error),
        })?;

        let resolution = buffer.resolution();
        let (width, height) = (resolution.width(), resolution.height());

        let (format, data) = match buffer.source_frame_format() {
            FrameFormat::YUYV => (PixelFormat::Yuyv422, buffer.buffer().to_vec()),
            FrameFormat::GRAY => (PixelFormat::Gray8, buffer.buffer().to_vec()),
            FrameFormat::RAWRGB => (PixelFormat::Rgb8, buffer.buffer().to_vec()),
            // Compressed and planar formats go through the backend's own decoder.
            _ => (
                PixelFormat::Rgb8,
                buffer
                    .decode_image::<RgbFormat>()
                    .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?
                    .into_raw(),
            ),
        };

        Ok(RawFrame {
            width,
            height,
            format,
            data,
        })
    }
}

fn classify_open(error: NokhwaError) -> CameraError {
    let message = error.to_string().to_ascii_lowercase();

    if message.contains("busy") || message.contains("in use") {
        CameraError::Busy
    } else {
        debug!(%error, "camera open failed");

        CameraError::NotFound
    }
}

use std::{
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use color_eyre::eyre::{eyre, WrapErr};
use image::RgbImage;
use osprey_camera::Frame;

/// Writes the frame as a PNG named after the current wall clock time.
pub fn save_frame(frame: &Frame, dir: &Path) -> color_eyre::Result<PathBuf> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .wrap_err("system clock is before the unix epoch")?
        .as_millis();

    let path = dir.join(format!("capture-{millis}.png"));

    save_frame_to(frame, &path)?;

    Ok(path)
}

fn save_frame_to(frame: &Frame, path: &Path) -> color_eyre::Result<()> {
    let image = RgbImage::from_raw(frame.width, frame.height, frame.rgb.clone())
        .ok_or_else(|| eyre!("frame buffer does not match {}x{}", frame.width, frame.height))?;

    image
        .save(path)
        .wrap_err_with(|| format!("failed to save capture to {}", path.display()))
}

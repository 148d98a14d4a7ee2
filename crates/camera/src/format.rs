#![forbid(clippy::cast_possible_wrap, clippy::cast_lossless)]

use std::{
    fmt::{self, Display},
    time::Instant,
};

/// Pixel layout a capture device hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
    Bgr8,
    Gray8,
    /// Packed 4:2:2, `Y0 U Y1 V` per pixel pair.
    Yuyv422,
}

impl PixelFormat {
    /// Bytes needed for a `width` x `height` image in this format, or `None`
    /// when that does not fit in memory at all.
    pub fn frame_len(self, width: u32, height: u32) -> Option<usize> {
        let pixels = usize::try_from(width)
            .ok()?
            .checked_mul(usize::try_from(height).ok()?)?;

        match self {
            PixelFormat::Rgb8 | PixelFormat::Bgr8 => pixels.checked_mul(3),
            PixelFormat::Gray8 => Some(pixels),
            PixelFormat::Yuyv422 => pixels.checked_mul(2),
        }
    }
}

/// A frame exactly as the device produced it.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

/// A frame converted for display: packed 8-bit RGB, row major.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
    pub captured_at: Instant,
    pub sequence: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    BadLength { expected: usize, got: usize },
    OddWidth(u32),
    TooLarge { width: u32, height: u32 },
}

impl Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::BadLength { expected, got } => {
                write!(f, "frame has {got} bytes, expected {expected}")
            }
            FormatError::OddWidth(width) => write!(f, "YUYV frame width {width} is odd"),
            FormatError::TooLarge { width, height } => {
                write!(f, "frame size {width}x{height} is out of range")
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Converts a device frame into packed RGB8.
pub fn to_rgb(frame: &RawFrame) -> Result<Vec<u8>, FormatError> {
    let expected = frame
        .format
        .frame_len(frame.width, frame.height)
        .ok_or(FormatError::TooLarge {
            width: frame.width,
            height: frame.height,
        })?;

    if frame.data.len() != expected {
        return Err(FormatError::BadLength {
            expected,
            got: frame.data.len(),
        });
    }

    Ok(match frame.format {
        PixelFormat::Rgb8 => frame.data.clone(),
        PixelFormat::Bgr8 => frame
            .data
            .chunks_exact(3)
            .flat_map(|bgr| [bgr[2], bgr[1], bgr[0]])
            .collect(),
        PixelFormat::Gray8 => frame.data.iter().flat_map(|&y| [y, y, y]).collect(),
        PixelFormat::Yuyv422 => {
            if frame.width % 2 != 0 {
                return Err(FormatError::OddWidth(frame.width));
            }

            frame
                .data
                .chunks_exact(4)
                .flat_map(|yuyv| {
                    let [y0, u, y1, v] = [yuyv[0], yuyv[1], yuyv[2], yuyv[3]];
                    let [r0, g0, b0] = yuv_to_rgb(y0, u, v);
                    let [r1, g1, b1] = yuv_to_rgb(y1, u, v);

                    [r0, g0, b0, r1, g1, b1]
                })
                .collect()
        }
    })
}

/// BT.601 studio swing, fixed point.
fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = i32::from(y) - 16;
    let d = i32::from(u) - 128;
    let e = i32::from(v) - 128;

    let clamp = |value: i32| ((value + 128) >> 8).clamp(0, 255) as u8;

    [
        clamp(298 * c + 409 * e),
        clamp(298 * c - 100 * d - 208 * e),
        clamp(298 * c + 516 * d),
    ]
}

//! Multi-frame monochrome bitmaps
//!
//! Image data starts with a five-byte header followed by the frames:
//!
//! ```text
//! width | height | frames | frame_size (u16 LE) | frame 0 | frame 1 | ...
//! ```
//!
//! Each frame is `frame_size` bytes of row-major pixels, one bit per pixel,
//! least significant bit first. A set bit is drawn white, a clear bit black.

/// Header length in bytes
pub const HEADER_LEN: usize = 5;

/// Image data that does not match its header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageError {
    /// Fewer than [`HEADER_LEN`] bytes
    MissingHeader,
    /// Frame size too small for width × height pixels
    FrameTooSmall,
    /// Fewer bytes than `frames × frame_size`
    Truncated,
}

/// Borrowed view of a validated image
#[derive(Debug, Clone, Copy)]
pub struct Image<'a> {
    width: u8,
    height: u8,
    frames: u8,
    frame_size: usize,
    data: &'a [u8],
}

impl<'a> Image<'a> {
    /// Parse and validate raw image bytes
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self, ImageError> {
        let (header, data) = bytes
            .split_first_chunk::<HEADER_LEN>()
            .ok_or(ImageError::MissingHeader)?;
        let [width, height, frames, lo, hi] = *header;
        let frame_size = u16::from_le_bytes([lo, hi]) as usize;

        let bits = width as usize * height as usize;
        if frame_size * 8 < bits {
            return Err(ImageError::FrameTooSmall);
        }
        if data.len() < frames as usize * frame_size {
            return Err(ImageError::Truncated);
        }
        Ok(Self {
            width,
            height,
            frames,
            frame_size,
            data,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u8 {
        self.height
    }

    /// Number of frames
    pub fn frames(&self) -> u8 {
        self.frames
    }

    /// Pixel (`x`, `y`) of `frame`, or `None` outside the image
    pub fn pixel(&self, frame: u8, x: u8, y: u8) -> Option<bool> {
        if frame >= self.frames || x >= self.width || y >= self.height {
            return None;
        }
        let bit = y as usize * self.width as usize + x as usize;
        let byte = self.data[frame as usize * self.frame_size + bit / 8];
        Some((byte >> (bit % 8)) & 1 != 0)
    }
}

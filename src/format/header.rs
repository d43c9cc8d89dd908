//! Fixed five byte asset header.

use std::io::{self, Read, Write};
use std::time::Duration;

use super::LoadError;

/// Header of an animation asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetHeader {
    /// Image width in pixels.
    pub width: u8,
    /// Image height in pixels.
    pub height: u8,
    /// Number of frames.
    pub frame_count: u8,
    /// Number of palette entries.
    pub color_count: u8,
    /// Playback speed in frames per second.
    pub fps: u8,
}

impl AssetHeader {
    /// Size of header in bytes.
    pub const SIZE: usize = 5;

    /// Parse a header from its raw bytes without validating it.
    pub fn from_bytes(bytes: [u8; Self::SIZE]) -> Self {
        Self {
            width: bytes[0],
            height: bytes[1],
            frame_count: bytes[2],
            color_count: bytes[3],
            fps: bytes[4],
        }
    }

    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        [
            self.width,
            self.height,
            self.frame_count,
            self.color_count,
            self.fps,
        ]
    }

    /// Parse the header at the start of `data` and validate it.
    pub fn parse(data: &[u8]) -> Result<Self, LoadError> {
        let bytes: [u8; Self::SIZE] = data
            .get(..Self::SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or(LoadError::Truncated {
                expected: Self::SIZE as u64,
                actual: data.len() as u64,
            })?;
        let header = Self::from_bytes(bytes);
        header.validate()?;
        Ok(header)
    }

    /// Reject headers that cannot be played back.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.width == 0 || self.height == 0 {
            return Err(LoadError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        if self.frame_count == 0 {
            return Err(LoadError::ZeroFrames);
        }
        if self.color_count == 0 {
            return Err(LoadError::NoColors);
        }
        if self.fps == 0 {
            return Err(LoadError::ZeroFps);
        }
        Ok(())
    }

    /// Number of index bytes in one frame.
    #[inline]
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of bytes in the palette section.
    #[inline]
    pub fn palette_len(&self) -> usize {
        self.color_count as usize * 3
    }

    /// Byte offset of the palette section.
    #[inline]
    pub const fn palette_offset(&self) -> usize {
        Self::SIZE
    }

    /// Byte offset of frame `n` from the start of the asset.
    #[inline]
    pub fn frame_offset(&self, n: usize) -> usize {
        Self::SIZE + self.palette_len() + n * self.frame_len()
    }

    /// Total asset length in bytes.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.frame_offset(self.frame_count as usize)
    }

    /// Check that an asset of `actual` bytes matches this header exactly.
    pub fn check_len(&self, actual: u64) -> Result<(), LoadError> {
        let expected = self.payload_len() as u64;
        if actual < expected {
            return Err(LoadError::Truncated { expected, actual });
        }
        if actual > expected {
            return Err(LoadError::TrailingBytes {
                extra: actual - expected,
            });
        }
        Ok(())
    }

    /// Minimum wall-clock gap between two presented frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1) as u32
    }

    /// Write header to output.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.to_bytes())
    }

    /// Read header from input. The result is not validated.
    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut buf = [0u8; Self::SIZE];
        r.read_exact(&mut buf)?;
        Ok(Self::from_bytes(buf))
    }
}

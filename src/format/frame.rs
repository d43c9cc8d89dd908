//! A single decoded frame of palette indices.

use super::Palette;
use crate::color::Rgb;

/// Position of pixel `(x, y)` inside a frame block.
///
/// Pixels are stored column by column: y varies fastest for a fixed x.
#[inline]
pub fn pixel_offset(x: usize, y: usize, height: usize) -> usize {
    x * height + y
}

/// Fully materialized bitmap of palette indices for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFrame {
    width: u8,
    height: u8,
    indices: Vec<u8>,
}

impl IndexedFrame {
    /// Wrap a frame block. Returns `None` if `indices` does not hold
    /// exactly `width * height` entries.
    pub fn new(width: u8, height: u8, indices: Vec<u8>) -> Option<Self> {
        if indices.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            indices,
        })
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Raw index block in storage order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.indices
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.indices
    }

    /// Palette index of pixel `(x, y)`.
    #[inline]
    pub fn index_at(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width as usize || y >= self.height as usize {
            return None;
        }
        self.indices
            .get(pixel_offset(x, y, self.height as usize))
            .copied()
    }

    /// Color of pixel `(x, y)` under `palette`.
    #[inline]
    pub fn color_at(&self, x: usize, y: usize, palette: &Palette) -> Option<Rgb> {
        self.index_at(x, y).and_then(|i| palette.get(i))
    }
}

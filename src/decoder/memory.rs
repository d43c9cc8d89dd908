//! Memory-resident decoder backend.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use log::debug;

use super::source::check_frame_index;
use super::{AdjustedPalette, DecoderError, FrameSource, StateError};
use crate::color::Rgb;
use crate::format::{AssetHeader, IndexedFrame, LoadError, Palette, Transport};

/// Default ceiling for memory-resident assets, in decoded bytes.
pub const DEFAULT_MEMORY_LIMIT: usize = 20_000;

#[derive(Debug)]
struct MemoryAsset {
    header: AssetHeader,
    data: Vec<u8>,
}

impl MemoryAsset {
    fn palette_colors(&self) -> &[Rgb] {
        let start = self.header.palette_offset();
        // Length is color_count * 3, checked at load.
        bytemuck::cast_slice(&self.data[start..start + self.header.palette_len()])
    }

    fn frame_bytes(&self, n: usize) -> &[u8] {
        let start = self.header.frame_offset(n);
        &self.data[start..start + self.header.frame_len()]
    }
}

/// Decoder that keeps the whole asset in RAM.
///
/// All accessors index straight into the buffer; no I/O happens after
/// load. Assets larger than the configured limit are refused before any
/// decode work.
#[derive(Debug)]
pub struct MemoryBackend {
    asset: Option<MemoryAsset>,
    limit: usize,
    adjusted: AdjustedPalette,
}

impl MemoryBackend {
    pub fn new(limit: usize) -> Self {
        Self {
            asset: None,
            limit,
            adjusted: AdjustedPalette::default(),
        }
    }

    /// Create an empty backend that starts at `brightness`.
    pub fn with_brightness(limit: usize, brightness: f32) -> Self {
        Self {
            adjusted: AdjustedPalette::new(brightness),
            ..Self::new(limit)
        }
    }

    /// Maximum asset size in bytes.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Bytes currently held, zero when empty.
    pub fn resident_bytes(&self) -> usize {
        self.asset.as_ref().map_or(0, |a| a.data.len())
    }

    fn check_capacity(&self, size: usize) -> Result<(), DecoderError> {
        if size > self.limit {
            return Err(DecoderError::Capacity {
                size,
                limit: self.limit,
            });
        }
        Ok(())
    }

    /// Take ownership of an unwrapped asset buffer.
    pub fn load_bytes(&mut self, data: Vec<u8>) -> Result<AssetHeader, DecoderError> {
        self.check_capacity(data.len())?;

        let header = AssetHeader::parse(&data)?;
        header.check_len(data.len() as u64)?;

        self.clear();
        self.asset = Some(MemoryAsset { header, data });
        self.adjusted.invalidate();

        debug!(
            "Memory backend holds {}x{} asset ({} frames, {} bytes)",
            header.width,
            header.height,
            header.frame_count,
            self.resident_bytes()
        );
        Ok(header)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_LIMIT)
    }
}

impl FrameSource for MemoryBackend {
    fn load(&mut self, path: &Path) -> Result<AssetHeader, DecoderError> {
        let file = File::open(path).map_err(LoadError::from)?;
        let len = fs::metadata(path)
            .map_err(LoadError::from)?
            .len();
        self.check_capacity(usize::try_from(len).unwrap_or(usize::MAX))?;

        let mut data = Vec::with_capacity(len as usize);
        file.take(len)
            .read_to_end(&mut data)
            .map_err(LoadError::from)?;
        self.load_bytes(data)
    }

    fn set_image(
        &mut self,
        data: &[u8],
        transport: Transport,
    ) -> Result<AssetHeader, DecoderError> {
        self.check_capacity(transport.decoded_len(data))?;
        let decoded = transport.decode(data)?;
        self.load_bytes(decoded.into_owned())
    }

    fn header(&self) -> Option<&AssetHeader> {
        self.asset.as_ref().map(|a| &a.header)
    }

    fn palette(&mut self) -> Result<&Palette, DecoderError> {
        let asset = self.asset.as_ref().ok_or(StateError::NoAsset)?;
        Ok(self.adjusted.get(asset.palette_colors()))
    }

    fn frame(&mut self, n: usize) -> Result<IndexedFrame, DecoderError> {
        let asset = self.asset.as_ref().ok_or(StateError::NoAsset)?;
        check_frame_index(&asset.header, n)?;
        let h = &asset.header;
        IndexedFrame::new(h.width, h.height, asset.frame_bytes(n).to_vec())
            .ok_or(DecoderError::FrameOutOfRange {
                index: n,
                frame_count: h.frame_count as usize,
            })
    }

    fn set_brightness(&mut self, brightness: f32) {
        self.adjusted.set_brightness(brightness);
    }

    fn brightness(&self) -> f32 {
        self.adjusted.brightness()
    }

    fn clear(&mut self) {
        self.asset = None;
        self.adjusted.invalidate();
    }
}

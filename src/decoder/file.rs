//! File-streamed decoder backend.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::debug;

use super::source::check_frame_index;
use super::{AdjustedPalette, DecoderError, FrameSource, StateError};
use crate::format::{AssetHeader, IndexedFrame, LoadError, Palette, Transport};

#[derive(Debug)]
struct OpenAsset {
    reader: BufReader<File>,
    path: PathBuf,
    header: AssetHeader,
    palette: Palette,
}

/// Decoder that streams frames from a persisted asset.
///
/// Only the header and palette stay resident. Each [`FrameSource::frame`]
/// call seeks to the frame block and reads exactly `width * height` bytes.
///
/// Usage:
/// ```ignore
/// let mut backend = FileBackend::new();
/// backend.load(Path::new("latest.image"))?;
/// let frame = backend.frame(0)?;
/// ```
#[derive(Debug, Default)]
pub struct FileBackend {
    asset: Option<OpenAsset>,
    adjusted: AdjustedPalette,
}

/// Read and validate the header of a persisted asset, checking the file
/// length against it. The palette and frames are not read.
pub fn probe(path: &Path) -> Result<AssetHeader, LoadError> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    if len < AssetHeader::SIZE as u64 {
        return Err(LoadError::Truncated {
            expected: AssetHeader::SIZE as u64,
            actual: len,
        });
    }
    let header = AssetHeader::read_from(&mut file)?;
    header.validate()?;
    header.check_len(len)?;
    Ok(header)
}

impl FileBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty backend that starts at `brightness`.
    pub fn with_brightness(brightness: f32) -> Self {
        Self {
            asset: None,
            adjusted: AdjustedPalette::new(brightness),
        }
    }

    /// Path of the open asset.
    pub fn path(&self) -> Option<&Path> {
        self.asset.as_ref().map(|a| a.path.as_path())
    }

    fn open(path: &Path) -> Result<OpenAsset, LoadError> {
        let header = probe(path)?;

        let mut reader = BufReader::new(File::open(path)?);
        reader.seek(SeekFrom::Start(header.palette_offset() as u64))?;
        let mut palette_bytes = vec![0u8; header.palette_len()];
        reader.read_exact(&mut palette_bytes)?;
        let palette = Palette::from_bytes(&palette_bytes)?;

        Ok(OpenAsset {
            reader,
            path: path.to_path_buf(),
            header,
            palette,
        })
    }
}

impl FrameSource for FileBackend {
    fn load(&mut self, path: &Path) -> Result<AssetHeader, DecoderError> {
        let asset = Self::open(path)?;
        let header = asset.header;

        self.clear();
        self.asset = Some(asset);

        debug!(
            "File backend streaming {}x{} asset from {} ({} frames, {} colors)",
            header.width,
            header.height,
            path.display(),
            header.frame_count,
            header.color_count
        );
        Ok(header)
    }

    fn set_image(
        &mut self,
        _data: &[u8],
        _transport: Transport,
    ) -> Result<AssetHeader, DecoderError> {
        Err(StateError::DirectBytesUnsupported.into())
    }

    fn header(&self) -> Option<&AssetHeader> {
        self.asset.as_ref().map(|a| &a.header)
    }

    fn palette(&mut self) -> Result<&Palette, DecoderError> {
        let asset = self.asset.as_ref().ok_or(StateError::NoAsset)?;
        Ok(self.adjusted.get(&asset.palette))
    }

    fn frame(&mut self, n: usize) -> Result<IndexedFrame, DecoderError> {
        let asset = self.asset.as_mut().ok_or(StateError::NoAsset)?;
        check_frame_index(&asset.header, n)?;

        let h = asset.header;
        asset
            .reader
            .seek(SeekFrom::Start(h.frame_offset(n) as u64))?;
        let mut indices = vec![0u8; h.frame_len()];
        asset.reader.read_exact(&mut indices)?;

        IndexedFrame::new(h.width, h.height, indices).ok_or(DecoderError::FrameOutOfRange {
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
        // Dropping the reader closes the handle.
        self.asset = None;
        self.adjusted.invalidate();
    }
}

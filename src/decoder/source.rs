//! Contract shared by every decoder backend.

use std::path::Path;

use super::{DecoderError, StateError};
use crate::format::{AssetHeader, IndexedFrame, Palette, Transport};

/// A loaded animation that frames and palette can be pulled from.
///
/// Every load first builds the new state and only then replaces the old
/// one, so a failed load leaves the previous asset readable.
pub trait FrameSource {
    /// Load a persisted asset by path.
    fn load(&mut self, path: &Path) -> Result<AssetHeader, DecoderError>;

    /// Load an asset from bytes, optionally transport-wrapped.
    fn set_image(
        &mut self,
        data: &[u8],
        transport: Transport,
    ) -> Result<AssetHeader, DecoderError>;

    /// Header of the loaded asset.
    fn header(&self) -> Option<&AssetHeader>;

    /// Brightness-adjusted palette of the loaded asset.
    fn palette(&mut self) -> Result<&Palette, DecoderError>;

    /// Materialize frame `n`.
    fn frame(&mut self, n: usize) -> Result<IndexedFrame, DecoderError>;

    /// Store a new brightness; the palette is remapped on next read.
    fn set_brightness(&mut self, brightness: f32);

    fn brightness(&self) -> f32;

    /// Release the asset and every resource tied to it. Idempotent.
    fn clear(&mut self);

    fn is_loaded(&self) -> bool {
        self.header().is_some()
    }

    /// `(width, height)` of the loaded asset.
    fn image_size(&self) -> Result<(u8, u8), DecoderError> {
        self.loaded_header().map(|h| (h.width, h.height))
    }

    fn len_frames(&self) -> Result<u8, DecoderError> {
        self.loaded_header().map(|h| h.frame_count)
    }

    fn no_colors(&self) -> Result<u8, DecoderError> {
        self.loaded_header().map(|h| h.color_count)
    }

    /// Frames per second.
    fn playspeed(&self) -> Result<u8, DecoderError> {
        self.loaded_header().map(|h| h.fps)
    }

    #[doc(hidden)]
    fn loaded_header(&self) -> Result<&AssetHeader, DecoderError> {
        self.header().ok_or(DecoderError::State(StateError::NoAsset))
    }
}

/// Range check shared by the backends.
pub(crate) fn check_frame_index(header: &AssetHeader, n: usize) -> Result<(), DecoderError> {
    if n >= header.frame_count as usize {
        return Err(DecoderError::FrameOutOfRange {
            index: n,
            frame_count: header.frame_count as usize,
        });
    }
    Ok(())
}

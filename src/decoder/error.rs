//! Decoder error taxonomy.

use std::io;

use crate::format::LoadError;

/// Operation not valid in the decoder's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("No asset loaded")]
    NoAsset,
    #[error("File backend can only load persisted assets, not raw bytes")]
    DirectBytesUnsupported,
}

/// Errors returned by decoder backends.
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Failed to load asset: {0}")]
    Load(#[from] LoadError),
    #[error("Asset of {size} bytes exceeds the {limit} byte memory limit")]
    Capacity { size: usize, limit: usize },
    #[error(transparent)]
    State(#[from] StateError),
    #[error("Frame {index} out of range ({frame_count} frames)")]
    FrameOutOfRange { index: usize, frame_count: usize },
    #[error("Failed to read frame: {0}")]
    Io(#[from] io::Error),
}

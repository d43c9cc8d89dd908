//! Errors raised while reading an asset.

use std::io;

/// Failure to load an asset from bytes or from storage.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Asset truncated: expected {expected} bytes, found {actual}")]
    Truncated { expected: u64, actual: u64 },
    #[error("Asset has {extra} unexpected trailing bytes")]
    TrailingBytes { extra: u64 },
    #[error("Image dimensions must be non-zero (got {width}x{height})")]
    ZeroDimension { width: u8, height: u8 },
    #[error("Asset contains no frames")]
    ZeroFrames,
    #[error("Playback speed must be at least 1 fps")]
    ZeroFps,
    #[error("Asset palette is empty")]
    NoColors,
    #[error("Invalid transport encoding: {0}")]
    Transport(#[from] base64::DecodeError),
}

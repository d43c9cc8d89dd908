//! Matrix Image - Palette-indexed animations for LED matrix displays.
//!
//! This crate encodes RGB frame sequences into a compact palette-indexed
//! asset, decodes them from RAM or straight from storage, adjusts brightness
//! in HSL space and paces playback at the asset's frame rate.
//!
//! # Architecture
//!
//! - `color`: RGB pixel type and RGB/HSL conversion
//! - `format`: Asset header, palette, indexed frames and transport wrapping
//! - `encoder`: RGB frames to asset bytes
//! - `decoder`: Memory and file backends behind one facade, brightness cache
//! - `playback`: Clock, scheduler, display sinks and statistics
//! - `ingest`: Chunked uploads staged to disk or RAM
//! - `schema`: Player configuration
//! - `context`: Decoder and scheduler wired together
//!
//! # Example
//!
//! ```rust,no_run
//! use matrix_image::{
//!     color::Rgb,
//!     encoder::{RgbFrame, encode},
//!     format::Transport,
//!     playback::RecordingSink,
//!     schema::PlayerConfig,
//!     decoder::BackendMode,
//!     MatrixContext,
//! };
//!
//! // Two frames of a 2x2 checkerboard
//! let frames: Vec<_> = (0..2)
//!     .map(|f| RgbFrame::from_fn(2, 2, |x, y| {
//!         if (x + y + f) % 2 == 0 { Rgb::new(255, 0, 0) } else { Rgb::new(0, 0, 255) }
//!     }))
//!     .collect();
//! let asset = encode(&frames, 2).unwrap();
//!
//! let config = PlayerConfig { mode: BackendMode::Memory, ..Default::default() };
//! let mut ctx = MatrixContext::new(config).unwrap();
//! ctx.set_image(&asset, Transport::Raw).unwrap();
//!
//! let mut sink = RecordingSink::new();
//! loop {
//!     ctx.update_display(&mut sink);
//! }
//! ```

pub mod color;
pub mod context;
pub mod decoder;
pub mod encoder;
pub mod format;
pub mod ingest;
pub mod playback;
pub mod schema;

// Re-export commonly used types
pub use context::MatrixContext;
pub use decoder::{BackendMode, Decoder, FrameSource};
pub use encoder::{Encoder, RgbFrame};
pub use format::{AssetHeader, Transport};
pub use schema::PlayerConfig;

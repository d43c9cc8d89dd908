//! Binary layout of palette-indexed animation assets.
//!
//! # File Format
//!
//! ```text
//! Header (5 bytes, one byte each):
//!   Width
//!   Height
//!   Frame count
//!   Color count
//!   Frames per second
//!
//! Palette (color_count * 3 bytes):
//!   R, G, B per entry, in order of first appearance during encoding
//!
//! Frame data (frame_count * width * height bytes):
//!   One palette index per pixel. Inside a frame the index for pixel
//!   (x, y) sits at x * height + y, so y varies fastest.
//! ```
//!
//! There is no magic, version or checksum. Assets may be wrapped in base64
//! for transport, see [`Transport`].

mod error;
mod frame;
mod header;
mod palette;
mod transport;

pub use error::LoadError;
pub use frame::{IndexedFrame, pixel_offset};
pub use header::AssetHeader;
pub use palette::Palette;
pub use transport::Transport;

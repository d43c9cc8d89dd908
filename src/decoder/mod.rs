//! Decoder backends and the facade that selects between them.
//!
//! Two backends implement the same [`FrameSource`] contract:
//!
//! - [`MemoryBackend`] holds the whole asset in RAM, bounded by a size limit.
//! - [`FileBackend`] keeps only header and palette resident and reads each
//!   frame from storage on demand.
//!
//! [`Decoder`] owns exactly one of them at a time.

mod brightness;
mod error;
mod facade;
mod file;
mod memory;
mod source;

pub use brightness::*;
pub use error::*;
pub use facade::*;
pub use file::*;
pub use memory::*;
pub use source::*;

//! Encoder - builds palette-indexed assets from true-color frames.

mod encode;
mod frame;
mod palette;

pub use encode::*;
pub use frame::*;
pub use palette::*;

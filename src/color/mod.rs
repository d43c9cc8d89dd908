//! Color-space utilities used by brightness remapping.

mod hsl;
mod rgb;

pub use hsl::*;
pub use rgb::*;

//! Discovery-order palette construction.

use std::collections::HashMap;

use crate::color::Rgb;
use crate::format::Palette;

/// Largest palette an asset can index with one byte.
pub const MAX_COLORS: usize = 255;

/// Collects distinct colors in the order they are first seen.
///
/// Re-observing the same sequence of colors always yields the same
/// indices, so encoding is deterministic.
#[derive(Debug, Default)]
pub struct PaletteBuilder {
    lookup: HashMap<Rgb, usize>,
    colors: Vec<Rgb>,
}

impl PaletteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `color` and return its index.
    pub fn observe(&mut self, color: Rgb) -> usize {
        *self.lookup.entry(color).or_insert_with(|| {
            self.colors.push(color);
            self.colors.len() - 1
        })
    }

    pub fn index_of(&self, color: Rgb) -> Option<usize> {
        self.lookup.get(&color).copied()
    }

    /// Number of distinct colors seen so far.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// True once more colors were seen than one byte can index.
    pub fn overflowed(&self) -> bool {
        self.colors.len() > MAX_COLORS
    }

    pub fn finish(self) -> Palette {
        Palette::new(self.colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_order() {
        let mut builder = PaletteBuilder::new();
        let red = Rgb::new(255, 0, 0);
        let blue = Rgb::new(0, 0, 255);

        assert_eq!(builder.observe(blue), 0);
        assert_eq!(builder.observe(red), 1);
        assert_eq!(builder.observe(blue), 0);
        assert_eq!(builder.len(), 2);
        assert_eq!(builder.index_of(red), Some(1));

        let palette = builder.finish();
        assert_eq!(palette.colors(), &[blue, red]);
    }

    #[test]
    fn test_overflow() {
        let mut builder = PaletteBuilder::new();
        for i in 0..=255u8 {
            builder.observe(Rgb::new(i, 0, 0));
        }
        assert_eq!(builder.len(), 256);
        assert!(builder.overflowed());
    }
}

//! Immutable color palette of an asset.

use std::ops::Deref;

use super::LoadError;
use crate::color::Rgb;

/// Ordered palette; a pixel's index selects its entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Self {
        Self { colors }
    }

    /// Build a palette from its packed `R, G, B` section.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let colors: &[Rgb] =
            bytemuck::try_cast_slice(bytes).map_err(|_| LoadError::Truncated {
                expected: bytes.len().next_multiple_of(3) as u64,
                actual: bytes.len() as u64,
            })?;
        Ok(Self {
            colors: colors.to_vec(),
        })
    }

    /// Packed `R, G, B` bytes, as stored in an asset.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Look up the color for a palette index.
    #[inline]
    pub fn get(&self, index: u8) -> Option<Rgb> {
        self.colors.get(index as usize).copied()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Apply `f` to every entry, keeping the order.
    pub fn map(&self, f: impl FnMut(&Rgb) -> Rgb) -> Self {
        Self {
            colors: self.colors.iter().map(f).collect(),
        }
    }
}

impl Deref for Palette {
    type Target = [Rgb];

    fn deref(&self) -> &[Rgb] {
        &self.colors
    }
}

impl From<Vec<Rgb>> for Palette {
    fn from(colors: Vec<Rgb>) -> Self {
        Self::new(colors)
    }
}

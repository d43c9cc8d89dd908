//! Lazily recomputed brightness-adjusted palette.

use crate::color::{Rgb, scale_lightness};
use crate::format::Palette;

/// Convert a `[0, 100]` percentage to normalised brightness.
pub fn brightness_from_percent(percent: f32) -> f32 {
    (percent / 100.0).clamp(0.0, 1.0)
}

/// Convert a `[0, 255]` byte level to normalised brightness.
pub fn brightness_from_byte(level: u8) -> f32 {
    level as f32 / 255.0
}

/// Scale the lightness of every palette entry by `brightness`.
pub fn adjust_palette(colors: &[Rgb], brightness: f32) -> Palette {
    colors
        .iter()
        .map(|&c| scale_lightness(c, brightness as f64))
        .collect::<Vec<_>>()
        .into()
}

/// Cached `(palette, brightness)` result with a dirty flag.
///
/// Changing the brightness only marks the cache stale; the remap runs on
/// the next [`AdjustedPalette::get`].
#[derive(Debug, Clone)]
pub struct AdjustedPalette {
    brightness: f32,
    value: Palette,
    dirty: bool,
}

impl AdjustedPalette {
    pub fn new(brightness: f32) -> Self {
        Self {
            brightness,
            value: Palette::default(),
            dirty: true,
        }
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn set_brightness(&mut self, brightness: f32) {
        self.brightness = brightness;
        self.dirty = true;
    }

    /// Drop the cached value, e.g. when the base palette changes.
    pub fn invalidate(&mut self) {
        self.value = Palette::default();
        self.dirty = true;
    }

    pub fn is_stale(&self) -> bool {
        self.dirty
    }

    /// Adjusted version of `base`, recomputed only if stale.
    pub fn get(&mut self, base: &[Rgb]) -> &Palette {
        if self.dirty {
            self.value = adjust_palette(base, self.brightness);
            self.dirty = false;
        }
        &self.value
    }
}

impl Default for AdjustedPalette {
    fn default() -> Self {
        Self::new(1.0)
    }
}

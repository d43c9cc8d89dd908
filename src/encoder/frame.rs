//! True-color source frames and crop windows.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Rectangular region cut out of every source frame before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropWindow {
    /// Left edge in source pixels.
    pub x: usize,
    /// Top edge in source pixels.
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl CropWindow {
    /// True if the window lies entirely inside a `width x height` frame.
    pub fn fits(&self, width: usize, height: usize) -> bool {
        self.x
            .checked_add(self.width)
            .is_some_and(|right| right <= width)
            && self
                .y
                .checked_add(self.height)
                .is_some_and(|bottom| bottom <= height)
    }
}

/// A true-color frame stored row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbFrame {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl RgbFrame {
    /// Wrap row-major pixels. Returns `None` if the pixel count does not
    /// match the dimensions.
    pub fn new(width: usize, height: usize, pixels: Vec<Rgb>) -> Option<Self> {
        if pixels.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a frame by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Rgb) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Build a frame from packed `R, G, B` row-major bytes.
    pub fn from_rgb_bytes(width: usize, height: usize, bytes: &[u8]) -> Option<Self> {
        let pixels: &[Rgb] = bytemuck::try_cast_slice(bytes).ok()?;
        Self::new(width, height, pixels.to_vec())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// Cut `window` out of this frame. Returns `None` if it does not fit.
    pub fn crop(&self, window: &CropWindow) -> Option<Self> {
        if !window.fits(self.width, self.height) {
            return None;
        }
        Some(Self::from_fn(window.width, window.height, |x, y| {
            self.pixels[(window.y + y) * self.width + window.x + x]
        }))
    }

    /// Iterate pixels in asset storage order (column by column).
    pub fn iter_storage_order(&self) -> impl Iterator<Item = Rgb> + '_ {
        (0..self.width).flat_map(move |x| {
            (0..self.height).map(move |y| self.pixels[y * self.width + x])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: usize, height: usize) -> RgbFrame {
        RgbFrame::from_fn(width, height, |x, y| Rgb::new(x as u8, y as u8, 0))
    }

    #[test]
    fn test_from_fn_row_major() {
        let frame = gradient(3, 2);
        assert_eq!(frame.get(2, 1), Some(Rgb::new(2, 1, 0)));
        assert_eq!(frame.get(3, 0), None);
    }

    #[test]
    fn test_crop() {
        let frame = gradient(8, 8);
        let window = CropWindow {
            x: 2,
            y: 3,
            width: 4,
            height: 2,
        };
        let cropped = frame.crop(&window).unwrap();
        assert_eq!(cropped.width(), 4);
        assert_eq!(cropped.height(), 2);
        assert_eq!(cropped.get(0, 0), Some(Rgb::new(2, 3, 0)));
        assert_eq!(cropped.get(3, 1), Some(Rgb::new(5, 4, 0)));
    }

    #[test]
    fn test_crop_out_of_bounds() {
        let frame = gradient(4, 4);
        let window = CropWindow {
            x: 2,
            y: 0,
            width: 3,
            height: 1,
        };
        assert!(frame.crop(&window).is_none());
        let overflow = CropWindow {
            x: usize::MAX,
            y: 0,
            width: 2,
            height: 1,
        };
        assert!(!overflow.fits(4, 4));
    }

    #[test]
    fn test_storage_order() {
        let frame = gradient(2, 2);
        let order: Vec<_> = frame.iter_storage_order().collect();
        assert_eq!(
            order,
            vec![
                Rgb::new(0, 0, 0),
                Rgb::new(0, 1, 0),
                Rgb::new(1, 0, 0),
                Rgb::new(1, 1, 0),
            ]
        );
    }

    #[test]
    fn test_from_rgb_bytes() {
        let frame = RgbFrame::from_rgb_bytes(2, 1, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(frame.get(1, 0), Some(Rgb::new(4, 5, 6)));
        assert!(RgbFrame::from_rgb_bytes(2, 2, &[1, 2, 3, 4, 5, 6]).is_none());
    }
}

//! Asset encoding.

use std::borrow::Cow;

use log::debug;
#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use super::{CropWindow, PaletteBuilder, RgbFrame};
use crate::format::AssetHeader;

/// Largest width, height or frame count a header byte can hold.
pub const MAX_DIMENSION: usize = u8::MAX as usize;

/// Encoder errors.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("No frames to encode")]
    NoFrames,
    #[error("Too many frames: {count} (max 255)")]
    TooManyFrames { count: usize },
    #[error("Frame rate must be at least 1 fps")]
    ZeroFps,
    #[error("Image dimensions must be non-zero (got {width}x{height})")]
    ZeroDimension { width: usize, height: usize },
    #[error("Image {width}x{height} exceeds 255x255")]
    DimensionTooLarge { width: usize, height: usize },
    #[error("Frame {index} is {found:?}, expected {expected:?}")]
    FrameSizeMismatch {
        index: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("Crop window {window:?} does not fit in a {width}x{height} frame")]
    CropOutOfBounds {
        window: CropWindow,
        width: usize,
        height: usize,
    },
    #[error("Too many colors: {found} distinct colors (max 255)")]
    TooManyColors { found: usize },
}

/// Builds an asset from a sequence of same-size true-color frames.
///
/// Usage:
/// ```ignore
/// let asset = Encoder::new(5).with_crop(window).encode(&frames)?;
/// std::fs::write("latest.image", asset)?;
/// ```
#[derive(Debug, Clone)]
pub struct Encoder {
    fps: u8,
    crop: Option<CropWindow>,
}

impl Encoder {
    pub fn new(fps: u8) -> Self {
        Self { fps, crop: None }
    }

    /// Cut the same window out of every frame before encoding.
    pub fn with_crop(mut self, crop: CropWindow) -> Self {
        self.crop = Some(crop);
        self
    }

    /// Encode `frames` into asset bytes.
    ///
    /// The palette lists colors in the order they are first met while
    /// scanning frames in sequence, each in storage order.
    pub fn encode(&self, frames: &[RgbFrame]) -> Result<Vec<u8>, EncodeError> {
        if self.fps == 0 {
            return Err(EncodeError::ZeroFps);
        }
        let first = frames.first().ok_or(EncodeError::NoFrames)?;
        if frames.len() > MAX_DIMENSION {
            return Err(EncodeError::TooManyFrames {
                count: frames.len(),
            });
        }

        let expected = (first.width(), first.height());
        for (index, frame) in frames.iter().enumerate() {
            let found = (frame.width(), frame.height());
            if found != expected {
                return Err(EncodeError::FrameSizeMismatch {
                    index,
                    expected,
                    found,
                });
            }
        }

        let frames: Vec<Cow<'_, RgbFrame>> = match &self.crop {
            Some(window) => frames
                .iter()
                .map(|f| f.crop(window).map(Cow::Owned))
                .collect::<Option<_>>()
                .ok_or(EncodeError::CropOutOfBounds {
                    window: *window,
                    width: expected.0,
                    height: expected.1,
                })?,
            None => frames.iter().map(Cow::Borrowed).collect(),
        };

        let (width, height) = match &self.crop {
            Some(window) => (window.width, window.height),
            None => expected,
        };
        if width == 0 || height == 0 {
            return Err(EncodeError::ZeroDimension { width, height });
        }
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(EncodeError::DimensionTooLarge { width, height });
        }

        // Palette order depends on scan order, so discovery stays sequential.
        let mut builder = PaletteBuilder::new();
        for frame in &frames {
            for color in frame.iter_storage_order() {
                builder.observe(color);
            }
        }

        if builder.overflowed() {
            return Err(EncodeError::TooManyColors {
                found: builder.len(),
            });
        }

        let frame_len = width * height;
        let mut indices = vec![0u8; frames.len() * frame_len];

        #[cfg(not(target_arch = "wasm32"))]
        indices
            .par_chunks_mut(frame_len)
            .zip(frames.par_iter())
            .for_each(|(block, frame)| index_frame(frame, &builder, block));

        #[cfg(target_arch = "wasm32")]
        indices
            .chunks_mut(frame_len)
            .zip(frames.iter())
            .for_each(|(block, frame)| index_frame(frame, &builder, block));

        let palette = builder.finish();
        let header = AssetHeader {
            width: width as u8,
            height: height as u8,
            frame_count: frames.len() as u8,
            color_count: palette.len() as u8,
            fps: self.fps,
        };

        let mut out = Vec::with_capacity(header.payload_len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(palette.as_bytes());
        out.extend_from_slice(&indices);

        debug!(
            "Encoded {}x{} asset: {} frames, {} colors, {} bytes",
            width,
            height,
            header.frame_count,
            header.color_count,
            out.len()
        );

        Ok(out)
    }
}

/// Write the palette index of every pixel of `frame` into `block`.
fn index_frame(frame: &RgbFrame, builder: &PaletteBuilder, block: &mut [u8]) {
    for (slot, color) in block.iter_mut().zip(frame.iter_storage_order()) {
        // Every color was observed during discovery.
        *slot = builder.index_of(color).unwrap_or_default() as u8;
    }
}

/// Encode `frames` at `fps` without cropping.
pub fn encode(frames: &[RgbFrame], fps: u8) -> Result<Vec<u8>, EncodeError> {
    Encoder::new(fps).encode(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use proptest::prelude::*;
    use std::collections::HashSet;

    const RED: Rgb = Rgb::new(255, 0, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 255);

    fn two_by_two() -> Vec<RgbFrame> {
        vec![
            RgbFrame::new(2, 2, vec![RED, BLUE, BLUE, RED]).unwrap(),
            RgbFrame::new(2, 2, vec![BLUE, BLUE, RED, RED]).unwrap(),
        ]
    }

    #[test]
    fn test_two_by_two_layout() {
        let asset = encode(&two_by_two(), 2).unwrap();
        assert_eq!(asset.len(), 5 + 6 + 8);
        assert_eq!(&asset[..5], &[2, 2, 2, 2, 2]);
        assert_eq!(&asset[5..11], &[255, 0, 0, 0, 0, 255]);

        // Frame 0 rows: [RED, BLUE], [BLUE, RED]. Column by column:
        // (0,0)=RED (0,1)=BLUE (1,0)=BLUE (1,1)=RED.
        assert_eq!(&asset[11..15], &[0, 1, 1, 0]);
        // Frame 1 rows: [BLUE, BLUE], [RED, RED].
        assert_eq!(&asset[15..19], &[1, 0, 1, 0]);
    }

    #[test]
    fn test_palette_is_unique_and_complete() {
        let frames: Vec<_> = (0..4)
            .map(|f| RgbFrame::from_fn(8, 4, |x, y| Rgb::new((x % 3) as u8, (y + f) as u8, 9)))
            .collect();
        let distinct: HashSet<Rgb> = frames
            .iter()
            .flat_map(|f| f.iter_storage_order())
            .collect();

        let asset = encode(&frames, 10).unwrap();
        let color_count = asset[3] as usize;
        assert_eq!(color_count, distinct.len());

        let palette: HashSet<&[u8]> = asset[5..5 + color_count * 3].chunks(3).collect();
        assert_eq!(palette.len(), color_count);
    }

    #[test]
    fn test_deterministic() {
        let frames = two_by_two();
        assert_eq!(encode(&frames, 3).unwrap(), encode(&frames, 3).unwrap());
    }

    #[test]
    fn test_too_many_colors() {
        let frame = RgbFrame::from_fn(16, 16, |x, y| Rgb::new(x as u8, y as u8, 0));
        let err = encode(&[frame], 1).unwrap_err();
        assert!(matches!(err, EncodeError::TooManyColors { found: 256 }));
    }

    #[test]
    fn test_exactly_255_colors() {
        let frame = RgbFrame::from_fn(255, 1, |x, _| Rgb::new(x as u8, 0, 0));
        let asset = encode(&[frame], 1).unwrap();
        assert_eq!(asset[3], 255);
    }

    #[test]
    fn test_frame_size_mismatch() {
        let frames = vec![
            RgbFrame::from_fn(2, 2, |_, _| RED),
            RgbFrame::from_fn(3, 2, |_, _| RED),
        ];
        assert!(matches!(
            encode(&frames, 1),
            Err(EncodeError::FrameSizeMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(encode(&[], 1), Err(EncodeError::NoFrames)));
        assert!(matches!(encode(&two_by_two(), 0), Err(EncodeError::ZeroFps)));

        let wide = RgbFrame::from_fn(256, 1, |_, _| RED);
        assert!(matches!(
            encode(&[wide], 1),
            Err(EncodeError::DimensionTooLarge { .. })
        ));

        let many = vec![RgbFrame::from_fn(1, 1, |_, _| RED); 256];
        assert!(matches!(
            encode(&many, 1),
            Err(EncodeError::TooManyFrames { count: 256 })
        ));
    }

    #[test]
    fn test_crop() {
        let frame = RgbFrame::from_fn(300, 300, |x, y| {
            if x >= 100 && y >= 100 { BLUE } else { RED }
        });
        let window = CropWindow {
            x: 99,
            y: 99,
            width: 2,
            height: 2,
        };
        let asset = Encoder::new(1).with_crop(window).encode(&[frame]).unwrap();
        assert_eq!(&asset[..5], &[2, 2, 1, 2, 1]);
        // (0,0) RED, (0,1) RED, (1,0) RED, (1,1) BLUE
        assert_eq!(&asset[11..], &[0, 0, 0, 1]);
    }

    #[test]
    fn test_crop_out_of_bounds() {
        let window = CropWindow {
            x: 1,
            y: 1,
            width: 2,
            height: 2,
        };
        assert!(matches!(
            Encoder::new(1).with_crop(window).encode(&two_by_two()),
            Err(EncodeError::CropOutOfBounds { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_palette_matches_distinct_colors(
            pool in proptest::collection::vec(any::<[u8; 3]>(), 1..64),
            width in 1usize..8,
            height in 1usize..8,
            frame_count in 1usize..5,
            picks in proptest::collection::vec(any::<prop::sample::Index>(), 8 * 8 * 5),
        ) {
            let frames: Vec<RgbFrame> = (0..frame_count)
                .map(|f| RgbFrame::from_fn(width, height, |x, y| {
                    Rgb::from(pool[picks[f * 64 + y * 8 + x].index(pool.len())])
                }))
                .collect();
            let distinct: HashSet<Rgb> = frames
                .iter()
                .flat_map(|f| f.iter_storage_order())
                .collect();

            let asset = encode(&frames, 1).unwrap();
            let color_count = asset[3] as usize;
            prop_assert_eq!(color_count, distinct.len());

            let palette: HashSet<Rgb> = asset[5..5 + color_count * 3]
                .chunks(3)
                .map(|c| Rgb::new(c[0], c[1], c[2]))
                .collect();
            prop_assert_eq!(palette.len(), color_count);
            prop_assert_eq!(palette, distinct);
        }
    }
}

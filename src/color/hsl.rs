//! RGB <-> HSL conversion.
//!
//! All HSL components are normalised to [0, 1]. Conversion back to RGB
//! truncates each channel instead of rounding, so lowering the lightness
//! never brightens a channel.

use super::Rgb;

/// Slack added before truncating a channel back to an integer. Absorbs
/// floating point noise from the round trip so that an unscaled color
/// converts back to exactly the same bytes.
const TRUNCATE_EPSILON: f64 = 1e-9;

/// A color in hue/saturation/lightness space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    /// Hue as a fraction of a full turn.
    pub h: f64,
    /// Saturation.
    pub s: f64,
    /// Lightness.
    pub l: f64,
}

/// Convert an RGB color to HSL.
pub fn rgb_to_hsl(color: Rgb) -> Hsl {
    let r = color.r as f64 / 255.0;
    let g = color.g as f64 / 255.0;
    let b = color.b as f64 / 255.0;

    let high = r.max(g).max(b);
    let low = r.min(g).min(b);
    let l = (high + low) / 2.0;

    if high == low {
        return Hsl { h: 0.0, s: 0.0, l };
    }

    let d = high - low;
    let s = (d / (1.0 - (2.0 * l - 1.0).abs())).clamp(0.0, 1.0);

    let h = if high == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if high == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsl { h: h / 6.0, s, l }
}

/// Fully saturated color at the given hue, each channel in [0, 1].
#[inline]
fn pure_hue(h: f64) -> (f64, f64, f64) {
    let r = (h * 6.0 - 3.0).abs() - 1.0;
    let g = 2.0 - (h * 6.0 - 2.0).abs();
    let b = 2.0 - (h * 6.0 - 4.0).abs();
    (r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
}

#[inline]
fn to_channel(v: f64) -> u8 {
    (v * 255.0 + TRUNCATE_EPSILON).floor().clamp(0.0, 255.0) as u8
}

/// Convert an HSL color back to RGB, truncating each channel.
pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    let l = hsl.l.clamp(0.0, 1.0);
    let s = hsl.s.clamp(0.0, 1.0);
    let (hr, hg, hb) = pure_hue(hsl.h);
    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;

    Rgb::new(
        to_channel((hr - 0.5) * chroma + l),
        to_channel((hg - 0.5) * chroma + l),
        to_channel((hb - 0.5) * chroma + l),
    )
}

/// Scale the lightness of a color by `factor`, keeping hue and saturation.
///
/// The scaled lightness is clamped to [0, 1]; a negative or NaN factor
/// yields black.
pub fn scale_lightness(color: Rgb, factor: f64) -> Rgb {
    let factor = if factor.is_nan() { 0.0 } else { factor.max(0.0) };
    let mut hsl = rgb_to_hsl(color);
    hsl.l = (hsl.l * factor).clamp(0.0, 1.0);
    hsl_to_rgb(hsl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_primaries() {
        let red = rgb_to_hsl(Rgb::new(255, 0, 0));
        assert!((red.h - 0.0).abs() < 1e-12);
        assert!((red.s - 1.0).abs() < 1e-12);
        assert!((red.l - 0.5).abs() < 1e-12);

        let green = rgb_to_hsl(Rgb::new(0, 255, 0));
        assert!((green.h - 1.0 / 3.0).abs() < 1e-12);

        let blue = rgb_to_hsl(Rgb::new(0, 0, 255));
        assert!((blue.h - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_grey_has_no_saturation() {
        let grey = rgb_to_hsl(Rgb::new(128, 128, 128));
        assert_eq!(grey.s, 0.0);
        assert_eq!(grey.h, 0.0);
        assert_eq!(hsl_to_rgb(grey), Rgb::new(128, 128, 128));
    }

    #[test]
    fn test_scale_to_zero_is_black() {
        for c in [Rgb::WHITE, Rgb::new(12, 200, 99), Rgb::new(255, 0, 128)] {
            assert_eq!(scale_lightness(c, 0.0), Rgb::BLACK);
        }
    }

    #[test]
    fn test_half_lightness_white() {
        // White at half lightness is mid grey, truncated.
        assert_eq!(scale_lightness(Rgb::WHITE, 0.5), Rgb::new(127, 127, 127));
    }

    #[test]
    fn test_negative_and_nan_factor() {
        assert_eq!(scale_lightness(Rgb::WHITE, -1.0), Rgb::BLACK);
        assert_eq!(scale_lightness(Rgb::WHITE, f64::NAN), Rgb::BLACK);
    }

    proptest! {
        #[test]
        fn prop_roundtrip_is_identity(r: u8, g: u8, b: u8) {
            let c = Rgb::new(r, g, b);
            prop_assert_eq!(hsl_to_rgb(rgb_to_hsl(c)), c);
            prop_assert_eq!(scale_lightness(c, 1.0), c);
        }

        #[test]
        fn prop_lightness_is_monotonic(r: u8, g: u8, b: u8, f1 in 0.0f64..1.0, f2 in 0.0f64..1.0) {
            let c = Rgb::new(r, g, b);
            let (lo, hi) = if f1 <= f2 { (f1, f2) } else { (f2, f1) };
            let dim = scale_lightness(c, lo);
            let bright = scale_lightness(c, hi);
            prop_assert!(dim.r <= bright.r);
            prop_assert!(dim.g <= bright.g);
            prop_assert!(dim.b <= bright.b);
        }
    }
}

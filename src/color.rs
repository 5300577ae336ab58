//! Color encodings and the perceptual primitives everything else is built on.
//!
//! [`Color`] stores an sRGB8 triple and nothing else. HSL, CIE Lab, Oklab and
//! Oklch are derived on demand through `palette`, so there is exactly one
//! source of truth and no drift between representations.

use std::fmt;
use std::str::FromStr;

use palette::color_difference::{Ciede2000, Wcag21RelativeContrast};
use palette::convert::FromColorUnclamped;
use palette::{Clamp, FromColor, Hsl, IntoColor, IsWithinBounds, Lab, LinSrgb, Oklab, Oklch, Srgb};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, SchemeError};

/// Bisection steps used when pulling an Oklch value back into the sRGB gamut.
const GAMUT_STEPS: usize = 20;

/// An opaque sRGB8 color. Equality, ordering and hashing are by channel value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub const fn red(self) -> u8 {
        self.red
    }

    pub const fn green(self) -> u8 {
        self.green
    }

    pub const fn blue(self) -> u8 {
        self.blue
    }

    pub fn from_srgb(srgb: Srgb<u8>) -> Self {
        Self::new(srgb.red, srgb.green, srgb.blue)
    }

    pub fn to_srgb(self) -> Srgb<u8> {
        Srgb::new(self.red, self.green, self.blue)
    }

    /// Linear-light RGB in `[0, 1]`.
    pub fn to_linear(self) -> LinSrgb {
        self.to_srgb().into_format::<f32>().into_linear()
    }

    /// Re-encode linear RGB, clamping anything outside the unit cube.
    pub fn from_linear(linear: LinSrgb) -> Self {
        let encoded: Srgb = Srgb::from_linear(linear.clamp());
        Self::from_srgb(encoded.clamp().into_format::<u8>())
    }

    /// HSL with hue in degrees; grays report a hue of 0.
    pub fn to_hsl(self) -> Hsl {
        Hsl::from_color(self.to_srgb().into_format::<f32>())
    }

    pub fn from_hsl(hsl: Hsl) -> Self {
        let rgb: Srgb = Srgb::from_color(hsl);
        Self::from_srgb(rgb.clamp().into_format::<u8>())
    }

    /// CIE L*a*b* under D65.
    pub fn to_lab(self) -> Lab {
        self.to_linear().into_color()
    }

    pub fn from_lab(lab: Lab) -> Self {
        Self::from_linear(lab.into_color())
    }

    pub fn to_oklab(self) -> Oklab {
        Oklab::from_color(self.to_linear())
    }

    pub fn from_oklab(oklab: Oklab) -> Self {
        Self::from_linear(LinSrgb::from_color(oklab))
    }

    pub fn to_oklch(self) -> Oklch {
        Oklch::from_color(self.to_oklab())
    }

    /// Convert from Oklch, reducing chroma until the color fits in sRGB.
    ///
    /// Lightness and hue are preserved, which keeps tone targets honest when
    /// a saturated seed is pushed to very light or very dark values.
    pub fn from_oklch(lch: Oklch) -> Self {
        let l = lch.l.clamp(0.0, 1.0);
        // `from_color` clamps, so the bounds check needs the raw value.
        let linear = |chroma: f32| LinSrgb::from_color_unclamped(Oklch::new(l, chroma, lch.hue));
        let fits = |chroma: f32| linear(chroma).is_within_bounds();

        let chroma = lch.chroma.max(0.0);
        if fits(chroma) {
            return Self::from_linear(linear(chroma));
        }

        let (mut lo, mut hi) = (0.0_f32, chroma);
        for _ in 0..GAMUT_STEPS {
            let mid = (lo + hi) * 0.5;
            if fits(mid) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Self::from_linear(linear(lo))
    }

    /// WCAG 2.x relative luminance in `[0, 1]`.
    pub fn relative_luminance(self) -> f64 {
        let srgb: Srgb = self.to_srgb().into_format();
        f64::from(srgb.relative_luminance().luma)
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }

    /// Parse `#RRGGBB`, `RRGGBB` or the `#RGB` shorthand.
    pub fn from_hex(input: &str) -> Result<Self> {
        let hex = input.trim().trim_start_matches('#');
        let invalid = || SchemeError::InvalidHex(input.to_string());
        if !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Self::new(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
            3 => {
                let short = |s: &str| channel(s).map(|v| v * 17);
                Ok(Self::new(short(&hex[0..1])?, short(&hex[1..2])?, short(&hex[2..3])?))
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = SchemeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl From<Srgb<u8>> for Color {
    fn from(srgb: Srgb<u8>) -> Self {
        Self::from_srgb(srgb)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        Color::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

// ------------------------------------------------------------
// Free-standing primitives
// ------------------------------------------------------------

pub fn srgb_to_linear(color: Color) -> LinSrgb {
    color.to_linear()
}

pub fn linear_to_srgb(linear: LinSrgb) -> Color {
    Color::from_linear(linear)
}

pub fn relative_luminance(color: Color) -> f64 {
    color.relative_luminance()
}

/// WCAG 2.x contrast ratio in `[1, 21]`. Symmetric in its arguments.
pub fn contrast_ratio(a: Color, b: Color) -> f64 {
    let a: Srgb = a.to_srgb().into_format();
    let b: Srgb = b.to_srgb().into_format();
    f64::from(a.relative_contrast(b))
}

/// CIEDE2000 color difference between two Lab values.
pub fn delta_e2000(a: Lab, b: Lab) -> f32 {
    a.difference(b)
}

/// Chroma of a Lab value (distance from the neutral axis).
pub fn lab_chroma(lab: Lab) -> f32 {
    lab.a.hypot(lab.b)
}

// ------------------------------------------------------------
// APCA (APCA-W3 0.0.98G constants)
// ------------------------------------------------------------

const APCA_COEF_R: f64 = 0.2126729;
const APCA_COEF_G: f64 = 0.7151522;
const APCA_COEF_B: f64 = 0.0721750;
const APCA_GAMMA: f64 = 2.4;

const APCA_BLACK_THRESHOLD: f64 = 0.022;
const APCA_BLACK_CLAMP: f64 = 1.414;

const APCA_SCALE: f64 = 1.14;
const APCA_OFFSET: f64 = 0.027;
const APCA_LOW_CLIP: f64 = 0.1;

// Normal polarity: dark text on a light background.
const APCA_NORMAL_BG: f64 = 0.56;
const APCA_NORMAL_TEXT: f64 = 0.57;
// Reverse polarity: light text on a dark background.
const APCA_REVERSE_BG: f64 = 0.65;
const APCA_REVERSE_TEXT: f64 = 0.62;

fn apca_luminance(color: Color) -> f64 {
    let channel = |v: u8| (f64::from(v) / 255.0).powf(APCA_GAMMA);
    let y = APCA_COEF_R * channel(color.red)
        + APCA_COEF_G * channel(color.green)
        + APCA_COEF_B * channel(color.blue);

    if y < APCA_BLACK_THRESHOLD {
        y + (APCA_BLACK_THRESHOLD - y).powf(APCA_BLACK_CLAMP)
    } else {
        y
    }
}

/// Signed APCA lightness contrast (Lc) of `fg` text on `bg`.
///
/// Positive for dark-on-light, negative for light-on-dark, roughly
/// `-108..=106`.
pub fn apca_lc(fg: Color, bg: Color) -> f64 {
    let y_fg = apca_luminance(fg);
    let y_bg = apca_luminance(bg);

    let c = if y_bg > y_fg {
        APCA_SCALE * (y_bg.powf(APCA_NORMAL_BG) - y_fg.powf(APCA_NORMAL_TEXT))
    } else {
        APCA_SCALE * (y_bg.powf(APCA_REVERSE_BG) - y_fg.powf(APCA_REVERSE_TEXT))
    };

    if c.abs() < APCA_LOW_CLIP {
        0.0
    } else if c > 0.0 {
        (c - APCA_OFFSET) * 100.0
    } else {
        (c + APCA_OFFSET) * 100.0
    }
}

/// Unsigned APCA contrast magnitude. Order matters: `fg` is the text color.
pub fn apca_contrast(fg: Color, bg: Color) -> f64 {
    apca_lc(fg, bg).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    fn channel_diff(a: Color, b: Color) -> u8 {
        a.red
            .abs_diff(b.red)
            .max(a.green.abs_diff(b.green))
            .max(a.blue.abs_diff(b.blue))
    }

    fn grid() -> Vec<Color> {
        let mut colors = Vec::new();
        for r in (0..=255u8).step_by(15) {
            for g in (0..=255u8).step_by(15) {
                for b in (0..=255u8).step_by(15) {
                    colors.push(Color::new(r, g, b));
                }
            }
        }
        colors
    }

    #[test]
    fn oklab_round_trip() {
        for c in grid() {
            let back = Color::from_oklab(c.to_oklab());
            assert!(channel_diff(c, back) <= 1, "{c} -> {back}");
        }
    }

    #[test]
    fn hsl_round_trip() {
        for c in grid() {
            let back = Color::from_hsl(c.to_hsl());
            assert!(channel_diff(c, back) <= 1, "{c} -> {back}");
        }
    }

    #[test]
    fn lab_round_trip() {
        for c in grid() {
            let back = Color::from_lab(c.to_lab());
            assert!(channel_diff(c, back) <= 1, "{c} -> {back}");
        }
    }

    #[test]
    fn gray_has_zero_hue_and_saturation() {
        let hsl = Color::new(128, 128, 128).to_hsl();
        assert_eq!(hsl.hue.into_positive_degrees(), 0.0);
        assert_eq!(hsl.saturation, 0.0);
        assert!(!hsl.lightness.is_nan());

        let black = Color::BLACK.to_hsl();
        assert_eq!(black.saturation, 0.0);
        assert_eq!(black.lightness, 0.0);
    }

    #[test]
    fn luminance_extremes() {
        assert!(approx_eq(Color::BLACK.relative_luminance(), 0.0, 1e-6));
        assert!(approx_eq(Color::WHITE.relative_luminance(), 1.0, 1e-4));
        let red = Color::new(255, 0, 0).relative_luminance();
        assert!(approx_eq(red, 0.2126, 0.001), "red luminance: {red}");
    }

    #[test]
    fn black_on_white_is_21() {
        let ratio = contrast_ratio(Color::WHITE, Color::BLACK);
        assert!(approx_eq(ratio, 21.0, 0.01), "B/W contrast: {ratio}");
    }

    #[test]
    fn contrast_is_symmetric() {
        let a = Color::new(204, 51, 77);
        let b = Color::new(26, 26, 102);
        assert!(approx_eq(contrast_ratio(a, b), contrast_ratio(b, a), 1e-9));
        assert!(approx_eq(contrast_ratio(a, a), 1.0, 1e-6));
    }

    #[test]
    fn apca_polarity() {
        let dark_on_light = apca_lc(Color::BLACK, Color::WHITE);
        let light_on_dark = apca_lc(Color::WHITE, Color::BLACK);
        assert!(dark_on_light > 100.0, "normal polarity: {dark_on_light}");
        assert!(light_on_dark < -100.0, "reverse polarity: {light_on_dark}");
    }

    #[test]
    fn apca_reference_values() {
        let cases = [
            (Color::BLACK, Color::WHITE, 106.04),
            (Color::WHITE, Color::BLACK, -107.88),
            (Color::new(0x88, 0x88, 0x88), Color::WHITE, 63.06),
        ];
        for (fg, bg, expected) in cases {
            let lc = apca_lc(fg, bg);
            assert!(approx_eq(lc, expected, 0.01), "{fg} on {bg}: Lc {lc}, expected {expected}");
        }
    }

    #[test]
    fn apca_is_not_symmetric() {
        let a = Color::new(0x33, 0x33, 0x33);
        let b = Color::new(0xEE, 0xEE, 0xEE);
        let ab = apca_contrast(a, b);
        let ba = apca_contrast(b, a);
        assert!((ab - ba).abs() > 0.5, "expected asymmetry: {ab} vs {ba}");
        assert_eq!(apca_contrast(a, a), 0.0);
    }

    #[test]
    fn delta_e_identity_and_order() {
        let blue = Color::new(0x63, 0x66, 0xF1).to_lab();
        let navy = Color::new(0x1E, 0x1B, 0x4B).to_lab();
        let orange = Color::new(0xF9, 0x73, 0x16).to_lab();
        assert!(delta_e2000(blue, blue).abs() < 1e-4);
        assert!(delta_e2000(blue, orange) > delta_e2000(blue, navy) * 0.5);
        assert!(delta_e2000(blue, orange) > 30.0);
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(Color::from_hex("#6366F1").unwrap(), Color::new(0x63, 0x66, 0xF1));
        assert_eq!(Color::from_hex("6366f1").unwrap(), Color::new(0x63, 0x66, 0xF1));
        assert_eq!(Color::from_hex("#fff").unwrap(), Color::WHITE);
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#GG0000").is_err());
        assert_eq!(Color::new(1, 2, 255).to_string(), "#0102FF");
    }

    #[test]
    fn serde_as_hex_string() {
        let json = serde_json::to_string(&Color::new(0xB3, 0x26, 0x1E)).unwrap();
        assert_eq!(json, "\"#B3261E\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::new(0xB3, 0x26, 0x1E));
    }

    #[test]
    fn oklch_gamut_mapping_keeps_lightness() {
        // Very high chroma at high lightness is far outside sRGB.
        let target = Oklch::new(0.9_f32, 0.35, 264.0);
        let mapped = Color::from_oklch(target);
        let l = mapped.to_oklab().l;
        assert!((l - 0.9).abs() < 0.01, "lightness drifted: {l}");
        let hue = mapped.to_oklch().hue.into_positive_degrees();
        assert!((hue - 264.0).abs() < 4.0, "hue drifted: {hue}");
    }

    #[test]
    fn oklch_gamut_mapping_reduces_chroma_only() {
        for hue in (0..360).step_by(30) {
            for l in [0.2_f32, 0.5, 0.8, 0.95] {
                let mapped = Color::from_oklch(Oklch::new(l, 0.4, hue as f32));
                let back = mapped.to_oklch();
                assert!((back.l - l).abs() < 0.01, "hue {hue} l {l}: lightness {}", back.l);
                assert!(back.chroma < 0.4);
                if back.chroma > 0.06 {
                    let drift = (back.hue.into_positive_degrees() - hue as f32).rem_euclid(360.0);
                    let drift = drift.min(360.0 - drift);
                    assert!(drift < 6.0, "hue {hue} l {l}: drifted {drift}");
                }
            }
        }
    }
}

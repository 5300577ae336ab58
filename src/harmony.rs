//! Hue-wheel harmonies: companion colors by rotating the seed's HSL hue.
//!
//! Saturation and lightness are held constant; only the hue moves.

use std::fmt;
use std::str::FromStr;

use palette::Hsl;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::SchemeError;

/// Rotation tables, in degrees, for each relation.
pub mod wheel {
    pub const COMPLEMENTARY: &[f32] = &[180.0];
    pub const TRIADIC: &[f32] = &[120.0, 240.0];
    pub const TETRADIC: &[f32] = &[90.0, 180.0, 270.0];
    pub const ANALOGOUS: &[f32] = &[30.0, -30.0];
    pub const SPLIT_COMPLEMENTARY: &[f32] = &[150.0, 210.0];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Harmony {
    Complementary,
    Triadic,
    Tetradic,
    Analogous,
    SplitComplementary,
}

impl Harmony {
    pub const ALL: [Harmony; 5] = [
        Harmony::Complementary,
        Harmony::Triadic,
        Harmony::Tetradic,
        Harmony::Analogous,
        Harmony::SplitComplementary,
    ];

    pub fn offsets(self) -> &'static [f32] {
        match self {
            Harmony::Complementary => wheel::COMPLEMENTARY,
            Harmony::Triadic => wheel::TRIADIC,
            Harmony::Tetradic => wheel::TETRADIC,
            Harmony::Analogous => wheel::ANALOGOUS,
            Harmony::SplitComplementary => wheel::SPLIT_COMPLEMENTARY,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Harmony::Complementary => "complementary",
            Harmony::Triadic => "triadic",
            Harmony::Tetradic => "tetradic",
            Harmony::Analogous => "analogous",
            Harmony::SplitComplementary => "splitComplementary",
        }
    }
}

impl fmt::Display for Harmony {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Harmony {
    type Err = SchemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        Harmony::ALL
            .into_iter()
            .find(|h| h.name().eq_ignore_ascii_case(&key))
            .ok_or_else(|| SchemeError::invalid_parameter("harmony", s))
    }
}

/// Rotate `seed`'s HSL hue by `degrees`, wrapping into `[0, 360)`.
pub fn rotate_hue(seed: Color, degrees: f32) -> Color {
    let hsl = seed.to_hsl();
    let hue = (hsl.hue.into_positive_degrees() + degrees).rem_euclid(360.0);
    Color::from_hsl(Hsl::new(hue, hsl.saturation, hsl.lightness))
}

/// Companion colors for `seed`, one per offset of `relation`, in table order.
pub fn harmonize(seed: Color, relation: Harmony) -> Vec<Color> {
    relation.offsets().iter().map(|&offset| rotate_hue(seed, offset)).collect()
}

/// Shortest angular distance between two hues, in degrees.
pub fn hue_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hue(c: Color) -> f32 {
        c.to_hsl().hue.into_positive_degrees()
    }

    #[test]
    fn offsets_per_relation() {
        let seed = Color::from_hex("#6366F1").unwrap();
        assert_eq!(harmonize(seed, Harmony::Complementary).len(), 1);
        assert_eq!(harmonize(seed, Harmony::Triadic).len(), 2);
        assert_eq!(harmonize(seed, Harmony::Tetradic).len(), 3);
        assert_eq!(harmonize(seed, Harmony::Analogous).len(), 2);
        assert_eq!(harmonize(seed, Harmony::SplitComplementary).len(), 2);
    }

    #[test]
    fn triadic_hues() {
        let seed = Color::from_hex("#E63946").unwrap();
        let base = hue(seed);
        for (color, offset) in harmonize(seed, Harmony::Triadic).into_iter().zip([120.0, 240.0]) {
            let expected = (base + offset) % 360.0;
            assert!(hue_distance(hue(color), expected) < 1.0, "{color}: {} vs {expected}", hue(color));
        }
    }

    #[test]
    fn analogous_wraps_negative_offsets() {
        let seed = Color::from_hex("#E6394F").unwrap();
        let base = hue(seed);
        let minus = harmonize(seed, Harmony::Analogous)[1];
        let expected = (base - 30.0).rem_euclid(360.0);
        assert!(hue_distance(hue(minus), expected) < 1.0);
    }

    #[test]
    fn saturation_and_lightness_held() {
        let seed = Color::from_hex("#6366F1").unwrap();
        let s = seed.to_hsl();
        for color in harmonize(seed, Harmony::Tetradic) {
            let h = color.to_hsl();
            assert!((h.saturation - s.saturation).abs() < 0.01, "saturation drifted for {color}");
            assert!((h.lightness - s.lightness).abs() < 0.01, "lightness drifted for {color}");
        }
    }

    #[test]
    fn complement_of_complement_returns() {
        let seed = Color::from_hex("#2A9D8F").unwrap();
        let there = harmonize(seed, Harmony::Complementary)[0];
        let back = harmonize(there, Harmony::Complementary)[0];
        assert!(hue_distance(hue(back), hue(seed)) < 1.5);
        assert!(seed.red().abs_diff(back.red()) <= 2);
        assert!(seed.green().abs_diff(back.green()) <= 2);
        assert!(seed.blue().abs_diff(back.blue()) <= 2);
    }

    #[test]
    fn parses_names() {
        assert_eq!("splitComplementary".parse::<Harmony>().unwrap(), Harmony::SplitComplementary);
        assert_eq!("split-complementary".parse::<Harmony>().unwrap(), Harmony::SplitComplementary);
        assert_eq!("TRIADIC".parse::<Harmony>().unwrap(), Harmony::Triadic);
        assert!("pentadic".parse::<Harmony>().is_err());
    }

    #[test]
    fn hue_distance_wraps() {
        assert_eq!(hue_distance(350.0, 10.0), 20.0);
        assert_eq!(hue_distance(10.0, 350.0), 20.0);
        assert_eq!(hue_distance(90.0, 270.0), 180.0);
    }
}

//! Contrast measurement and repair.
//!
//! Measurement is WCAG 2.x (relative luminance) plus APCA. Repair moves a
//! color's Oklab lightness in damped multiplicative steps until it reaches a
//! target ratio against a reference, keeping hue and (roughly) chroma.

use palette::{Mix, Oklab, Oklch};
use serde::{Deserialize, Serialize};

use crate::color::{apca_contrast, contrast_ratio, Color};
use crate::config::AdjustConfig;

/// Luminance at which black and white give the same WCAG contrast.
const PIVOT_LUMINANCE: f64 = 0.179;
/// Lightness floor so a black starting point can still be scaled up.
const MIN_SCALABLE_L: f64 = 0.05;
/// Extra ratio aimed for so the damped approach crosses the real target.
const AIM_MARGIN: f64 = 0.15;
const BISECT_STEPS: usize = 24;

pub fn ratio(fg: Color, bg: Color) -> f64 {
    contrast_ratio(fg, bg)
}

pub fn apca(fg: Color, bg: Color) -> f64 {
    apca_contrast(fg, bg)
}

/// Which side of a pair is being moved. Backgrounds keep their chroma;
/// foregrounds get the configured chroma boost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContrastRole {
    Foreground,
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Lighten,
    Darken,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Lighten => Direction::Darken,
            Direction::Darken => Direction::Lighten,
        }
    }

    /// The furthest color in this direction.
    pub fn extreme(self) -> Color {
        match self {
            Direction::Lighten => Color::WHITE,
            Direction::Darken => Color::BLACK,
        }
    }

    /// The direction that moves `color` away from `reference` without
    /// crossing it. Equal luminances go toward whichever extreme contrasts
    /// more with `reference`.
    pub fn away_from(color: Color, reference: Color) -> Self {
        let y = color.relative_luminance();
        let y_ref = reference.relative_luminance();
        if y > y_ref {
            Direction::Lighten
        } else if y < y_ref {
            Direction::Darken
        } else if y_ref < PIVOT_LUMINANCE {
            Direction::Lighten
        } else {
            Direction::Darken
        }
    }
}

/// Outcome of a contrast repair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    pub color: Color,
    pub ratio: f64,
    /// `false` when the target lies outside what sRGB can reach against the
    /// reference; `color` is then the closest achievable color.
    pub met: bool,
}

/// Luminance that gives exactly `target` against `y_ref` in `direction`.
fn goal_luminance(direction: Direction, y_ref: f64, target: f64) -> f64 {
    match direction {
        Direction::Lighten => target * (y_ref + 0.05) - 0.05,
        Direction::Darken => (y_ref + 0.05) / target - 0.05,
    }
    .clamp(0.0, 1.0)
}

/// Move `color` until `ratio(color, reference) >= target`.
///
/// A color that already meets the target is returned untouched. Otherwise
/// lightness is scaled by `(goal / current)^damping` per step (luminance
/// offset by 0.05 as in the WCAG formula), chroma is boosted by up to
/// `chroma_boost_cap` for foregrounds, and the result is gamut mapped. When
/// the natural direction (away from `reference`) cannot reach the target the
/// other direction is tried; if neither can, the better extreme is returned
/// with `met == false`.
pub fn adjust_to_target_contrast(
    color: Color,
    reference: Color,
    target: f64,
    role: ContrastRole,
    config: &AdjustConfig,
) -> Adjustment {
    let current = contrast_ratio(color, reference);
    if current >= target {
        return Adjustment {
            color,
            ratio: current,
            met: true,
        };
    }

    let natural = Direction::away_from(color, reference);
    let reaches = |d: Direction| contrast_ratio(d.extreme(), reference) >= target;
    let direction = if reaches(natural) {
        natural
    } else if reaches(natural.opposite()) {
        natural.opposite()
    } else {
        let natural_best = contrast_ratio(natural.extreme(), reference);
        let opposite_best = contrast_ratio(natural.opposite().extreme(), reference);
        let (closest, achieved) = if natural_best >= opposite_best {
            (natural.extreme(), natural_best)
        } else {
            (natural.opposite().extreme(), opposite_best)
        };
        log::debug!("{color} cannot reach {target:.2}:1 against {reference}; best is {achieved:.2}:1");
        return Adjustment {
            color: closest,
            ratio: achieved,
            met: achieved + config.tolerance >= target,
        };
    };

    let y_ref = reference.relative_luminance();
    let y_goal = goal_luminance(direction, y_ref, target + AIM_MARGIN);

    let lch = color.to_oklch();
    let chroma = match role {
        ContrastRole::Foreground => lch.chroma * (1.0 + config.chroma_boost_cap),
        ContrastRole::Background => lch.chroma,
    };

    let mut l = f64::from(lch.l).max(MIN_SCALABLE_L);
    let mut candidate = color;
    for _ in 0..config.max_steps {
        let y = candidate.relative_luminance();
        let factor = ((y_goal + 0.05) / (y + 0.05)).powf(config.damping_exponent);
        l = (l * factor).clamp(0.0, 1.0);

        let next = Color::from_oklch(Oklch::new(l as f32, chroma, lch.hue));
        if contrast_ratio(next, reference) >= target {
            return finish(next, reference, target, config);
        }
        if next == candidate {
            // Quantization or the gamut edge stalled the walk.
            break;
        }
        candidate = next;
    }

    finish(bisect_toward_extreme(candidate, reference, target, direction), reference, target, config)
}

/// Smallest Oklab mix from `from` toward the direction's extreme that meets
/// `target`. The extreme itself is known to meet it.
fn bisect_toward_extreme(from: Color, reference: Color, target: f64, direction: Direction) -> Color {
    let start: Oklab = from.to_oklab();
    let end: Oklab = direction.extreme().to_oklab();
    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    for _ in 0..BISECT_STEPS {
        let mid = (lo + hi) * 0.5;
        if contrast_ratio(Color::from_oklab(start.mix(end, mid)), reference) >= target {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    let mixed = Color::from_oklab(start.mix(end, hi));
    if contrast_ratio(mixed, reference) >= target {
        mixed
    } else {
        direction.extreme()
    }
}

fn finish(color: Color, reference: Color, target: f64, config: &AdjustConfig) -> Adjustment {
    let ratio = contrast_ratio(color, reference);
    Adjustment {
        color,
        ratio,
        met: ratio + config.tolerance >= target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harmony::hue_distance;

    fn hex(s: &str) -> Color {
        Color::from_hex(s).unwrap()
    }

    fn adjust(color: Color, reference: Color, target: f64) -> Adjustment {
        adjust_to_target_contrast(color, reference, target, ContrastRole::Foreground, &AdjustConfig::default())
    }

    #[test]
    fn already_passing_is_untouched() {
        let fg = hex("#1B1B1F");
        let bg = hex("#FFFBFF");
        let before = ratio(fg, bg);
        let result = adjust(fg, bg, 4.5);
        assert_eq!(result.color, fg);
        assert!(result.met);
        assert!(result.ratio >= before - 1e-9);
    }

    #[test]
    fn darkens_on_light_background() {
        let fg = hex("#8E90F5");
        let bg = hex("#FBF8FF");
        let result = adjust(fg, bg, 4.5);
        assert!(result.met);
        assert!(ratio(result.color, bg) >= 4.5, "got {}", ratio(result.color, bg));
        assert!(result.color.relative_luminance() < fg.relative_luminance());
    }

    #[test]
    fn lightens_on_dark_background() {
        let fg = hex("#3A3F8F");
        let bg = hex("#121318");
        let result = adjust(fg, bg, 7.0);
        assert!(result.met);
        assert!(ratio(result.color, bg) >= 7.0);
        assert!(result.color.relative_luminance() > fg.relative_luminance());
    }

    #[test]
    fn keeps_hue_family() {
        let fg = hex("#2E7D32");
        let bg = hex("#1A1C19");
        let result = adjust(fg, bg, 7.0);
        let before = fg.to_oklch().hue.into_positive_degrees();
        let after = result.color.to_oklch().hue.into_positive_degrees();
        assert!(hue_distance(before, after) < 12.0, "hue moved {before} -> {after}");
    }

    #[test]
    fn saturated_colors_keep_hue_when_lightened() {
        let bg = hex("#1B1B1F");
        for fg in ["#7C3AED", "#0000FF"] {
            let fg = hex(fg);
            let result = adjust(fg, bg, 8.0);
            assert!(result.met, "{fg}: ratio {}", result.ratio);
            let before = fg.to_oklch().hue.into_positive_degrees();
            let after = result.color.to_oklch().hue.into_positive_degrees();
            assert!(hue_distance(before, after) < 5.0, "{fg} -> {}: hue {before} -> {after}", result.color);
        }
    }

    #[test]
    fn flips_when_natural_direction_cannot_reach() {
        // White against mid gray tops out below 4.6:1; black gets there.
        let reference = hex("#777777");
        let result = adjust(hex("#999999"), reference, 4.6);
        assert!(result.met);
        assert!(ratio(result.color, reference) >= 4.6);
        assert!(result.color.relative_luminance() < reference.relative_luminance());
    }

    #[test]
    fn unreachable_target_reports_closest() {
        let reference = hex("#777777");
        let result = adjust(hex("#888888"), reference, 10.0);
        assert!(!result.met);
        let white = ratio(Color::WHITE, reference);
        let black = ratio(Color::BLACK, reference);
        assert!((result.ratio - white.max(black)).abs() < 1e-9);
    }

    #[test]
    fn background_role_moves_background() {
        let bg = hex("#6366F1");
        let result = adjust_to_target_contrast(bg, Color::WHITE, 7.0, ContrastRole::Background, &AdjustConfig::default());
        assert!(result.met);
        assert!(ratio(result.color, Color::WHITE) >= 7.0);
    }

    #[test]
    fn black_start_can_lighten() {
        let reference = hex("#202020");
        let result = adjust(Color::BLACK, reference, 4.5);
        assert!(result.met, "ratio {}", result.ratio);
        assert!(result.color.relative_luminance() > reference.relative_luminance());
    }

    #[test]
    fn direction_away_from() {
        assert_eq!(Direction::away_from(Color::WHITE, Color::BLACK), Direction::Lighten);
        assert_eq!(Direction::away_from(Color::BLACK, Color::WHITE), Direction::Darken);
        assert_eq!(Direction::away_from(Color::BLACK, Color::BLACK), Direction::Lighten);
        assert_eq!(Direction::away_from(Color::WHITE, Color::WHITE), Direction::Darken);
    }
}

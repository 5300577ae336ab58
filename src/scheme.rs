//! Expand one to three seed colors into six complete role palettes.
//!
//! ```text
//! SeedSet ──complete()──▶ CompleteSeeds
//!     │
//!     ▼
//! tonal recipes ──▶ light / dark base palettes (standard targets enforced)
//!     │
//!     ▼
//! clone + stricter targets ──▶ medium / high contrast palettes
//!     │
//!     ▼
//! verification ──▶ SchemeBundle (+ ContrastWarning per unmet pair)
//! ```
//!
//! Tones are Material-style CIE L* values (0 = black, 100 = white), reached
//! by searching Oklch lightness at fixed hue and chroma. Seed-colored
//! roles keep the seed's Oklch hue and chroma; neutral roles use the primary
//! hue at a very low chroma; error roles use a fixed red seed.

use std::ops::Index;

use palette::Oklch;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::color::{apca_contrast, contrast_ratio, Color};
use crate::config::{AdjustConfig, ContrastTargets, HarmonyDefaults, SchemeConfig, VariantTargets};
use crate::contrast::{adjust_to_target_contrast, ContrastRole, Direction};
use crate::error::{Result, SchemeError};
use crate::harmony::{harmonize, rotate_hue, Harmony};

/// Fixed seed for the error roles.
pub const ERROR_SEED: Color = Color::new(0xB3, 0x26, 0x1E);
/// Oklch chroma of the neutral (surface) and neutral-variant (outline) axes.
pub const NEUTRAL_CHROMA: f32 = 0.008;
pub const NEUTRAL_VARIANT_CHROMA: f32 = 0.02;

/// Tone ranges a key role may take: light schemes want a mid-dark key
/// under white text, dark schemes a light key under dark text.
const KEY_TONES_LIGHT: (f32, f32) = (30.0, 45.0);
const KEY_TONES_DARK: (f32, f32) = (70.0, 85.0);

/// How far past a target a background is pushed when its foreground cannot
/// reach the target on its own.
const BACKGROUND_HEADROOM: f64 = 1.0;
const ENFORCE_PASSES: usize = 3;
const TONE_STEPS: usize = 20;

// ------------------------------------------------------------
// Roles
// ------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Primary,
    OnPrimary,
    PrimaryContainer,
    OnPrimaryContainer,
    Secondary,
    OnSecondary,
    SecondaryContainer,
    OnSecondaryContainer,
    Tertiary,
    OnTertiary,
    TertiaryContainer,
    OnTertiaryContainer,
    Error,
    OnError,
    ErrorContainer,
    OnErrorContainer,
    Background,
    OnBackground,
    Surface,
    OnSurface,
    SurfaceVariant,
    OnSurfaceVariant,
    Outline,
    OutlineVariant,
    Shadow,
    Scrim,
    InverseSurface,
    InverseOnSurface,
    InversePrimary,
    SurfaceDim,
    SurfaceBright,
    SurfaceContainerLowest,
    SurfaceContainerLow,
    SurfaceContainer,
    SurfaceContainerHigh,
    SurfaceContainerHighest,
}

impl Role {
    pub const COUNT: usize = 36;

    /// Every role, in declaration order (`ALL[r as usize] == r`).
    pub const ALL: [Role; Role::COUNT] = [
        Role::Primary,
        Role::OnPrimary,
        Role::PrimaryContainer,
        Role::OnPrimaryContainer,
        Role::Secondary,
        Role::OnSecondary,
        Role::SecondaryContainer,
        Role::OnSecondaryContainer,
        Role::Tertiary,
        Role::OnTertiary,
        Role::TertiaryContainer,
        Role::OnTertiaryContainer,
        Role::Error,
        Role::OnError,
        Role::ErrorContainer,
        Role::OnErrorContainer,
        Role::Background,
        Role::OnBackground,
        Role::Surface,
        Role::OnSurface,
        Role::SurfaceVariant,
        Role::OnSurfaceVariant,
        Role::Outline,
        Role::OutlineVariant,
        Role::Shadow,
        Role::Scrim,
        Role::InverseSurface,
        Role::InverseOnSurface,
        Role::InversePrimary,
        Role::SurfaceDim,
        Role::SurfaceBright,
        Role::SurfaceContainerLowest,
        Role::SurfaceContainerLow,
        Role::SurfaceContainer,
        Role::SurfaceContainerHigh,
        Role::SurfaceContainerHighest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Role::Primary => "primary",
            Role::OnPrimary => "onPrimary",
            Role::PrimaryContainer => "primaryContainer",
            Role::OnPrimaryContainer => "onPrimaryContainer",
            Role::Secondary => "secondary",
            Role::OnSecondary => "onSecondary",
            Role::SecondaryContainer => "secondaryContainer",
            Role::OnSecondaryContainer => "onSecondaryContainer",
            Role::Tertiary => "tertiary",
            Role::OnTertiary => "onTertiary",
            Role::TertiaryContainer => "tertiaryContainer",
            Role::OnTertiaryContainer => "onTertiaryContainer",
            Role::Error => "error",
            Role::OnError => "onError",
            Role::ErrorContainer => "errorContainer",
            Role::OnErrorContainer => "onErrorContainer",
            Role::Background => "background",
            Role::OnBackground => "onBackground",
            Role::Surface => "surface",
            Role::OnSurface => "onSurface",
            Role::SurfaceVariant => "surfaceVariant",
            Role::OnSurfaceVariant => "onSurfaceVariant",
            Role::Outline => "outline",
            Role::OutlineVariant => "outlineVariant",
            Role::Shadow => "shadow",
            Role::Scrim => "scrim",
            Role::InverseSurface => "inverseSurface",
            Role::InverseOnSurface => "inverseOnSurface",
            Role::InversePrimary => "inversePrimary",
            Role::SurfaceDim => "surfaceDim",
            Role::SurfaceBright => "surfaceBright",
            Role::SurfaceContainerLowest => "surfaceContainerLowest",
            Role::SurfaceContainerLow => "surfaceContainerLow",
            Role::SurfaceContainer => "surfaceContainer",
            Role::SurfaceContainerHigh => "surfaceContainerHigh",
            Role::SurfaceContainerHighest => "surfaceContainerHighest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PairKind {
    /// Text and icons.
    Text,
    /// Large-scale elements such as outlines and inverse accents.
    Large,
}

/// A foreground role that is drawn on top of a background role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolePair {
    pub foreground: Role,
    pub background: Role,
    pub kind: PairKind,
}

const fn text(foreground: Role, background: Role) -> RolePair {
    RolePair {
        foreground,
        background,
        kind: PairKind::Text,
    }
}

const fn large(foreground: Role, background: Role) -> RolePair {
    RolePair {
        foreground,
        background,
        kind: PairKind::Large,
    }
}

/// Every pair whose contrast is guaranteed.
pub const ROLE_PAIRS: &[RolePair] = &[
    text(Role::OnPrimary, Role::Primary),
    text(Role::OnPrimaryContainer, Role::PrimaryContainer),
    text(Role::OnSecondary, Role::Secondary),
    text(Role::OnSecondaryContainer, Role::SecondaryContainer),
    text(Role::OnTertiary, Role::Tertiary),
    text(Role::OnTertiaryContainer, Role::TertiaryContainer),
    text(Role::OnError, Role::Error),
    text(Role::OnErrorContainer, Role::ErrorContainer),
    text(Role::OnBackground, Role::Background),
    text(Role::OnSurface, Role::Surface),
    text(Role::OnSurface, Role::SurfaceContainerHighest),
    text(Role::OnSurfaceVariant, Role::SurfaceVariant),
    text(Role::InverseOnSurface, Role::InverseSurface),
    large(Role::Outline, Role::Surface),
    large(Role::InversePrimary, Role::InverseSurface),
];

// ------------------------------------------------------------
// Variants
// ------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Variant {
    Light,
    Dark,
    LightMediumContrast,
    LightHighContrast,
    DarkMediumContrast,
    DarkHighContrast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContrastLevel {
    Standard,
    Medium,
    High,
}

impl Variant {
    pub const ALL: [Variant; 6] = [
        Variant::Light,
        Variant::Dark,
        Variant::LightMediumContrast,
        Variant::LightHighContrast,
        Variant::DarkMediumContrast,
        Variant::DarkHighContrast,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Variant::Light => "light",
            Variant::Dark => "dark",
            Variant::LightMediumContrast => "lightMediumContrast",
            Variant::LightHighContrast => "lightHighContrast",
            Variant::DarkMediumContrast => "darkMediumContrast",
            Variant::DarkHighContrast => "darkHighContrast",
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(
            self,
            Variant::Dark | Variant::DarkMediumContrast | Variant::DarkHighContrast
        )
    }

    pub fn level(self) -> ContrastLevel {
        match self {
            Variant::Light | Variant::Dark => ContrastLevel::Standard,
            Variant::LightMediumContrast | Variant::DarkMediumContrast => ContrastLevel::Medium,
            Variant::LightHighContrast | Variant::DarkHighContrast => ContrastLevel::High,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl VariantTargets {
    pub fn for_variant(&self, variant: Variant) -> ContrastTargets {
        match variant.level() {
            ContrastLevel::Standard => self.standard,
            ContrastLevel::Medium => self.medium,
            ContrastLevel::High => self.high,
        }
    }
}

impl ContrastTargets {
    pub fn minimum(&self, kind: PairKind) -> f64 {
        match kind {
            PairKind::Text => self.text,
            PairKind::Large => self.large,
        }
    }
}

// ------------------------------------------------------------
// Seeds
// ------------------------------------------------------------

/// Caller-supplied seeds. `primary` is mandatory; the others are derived
/// by hue rotation when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSet {
    primary: Color,
    secondary: Option<Color>,
    tertiary: Option<Color>,
}

/// Seeds with every slot filled, as actually used for synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompleteSeeds {
    pub primary: Color,
    pub secondary: Color,
    pub tertiary: Color,
}

impl SeedSet {
    pub fn new(primary: Color) -> Self {
        Self {
            primary,
            secondary: None,
            tertiary: None,
        }
    }

    pub fn with_secondary(self, secondary: Color) -> Self {
        Self {
            secondary: Some(secondary),
            ..self
        }
    }

    pub fn with_tertiary(self, tertiary: Color) -> Self {
        Self {
            tertiary: Some(tertiary),
            ..self
        }
    }

    /// Seeds in primary, secondary, tertiary order.
    ///
    /// # Errors
    ///
    /// [`SchemeError::InvalidSeedCount`] for an empty slice or more than three.
    pub fn from_colors(colors: &[Color]) -> Result<Self> {
        match *colors {
            [primary] => Ok(Self::new(primary)),
            [primary, secondary] => Ok(Self::new(primary).with_secondary(secondary)),
            [primary, secondary, tertiary] => Ok(Self::new(primary).with_secondary(secondary).with_tertiary(tertiary)),
            _ => Err(SchemeError::InvalidSeedCount(colors.len())),
        }
    }

    pub fn primary(&self) -> Color {
        self.primary
    }

    pub fn secondary(&self) -> Option<Color> {
        self.secondary
    }

    pub fn tertiary(&self) -> Option<Color> {
        self.tertiary
    }

    /// Fill missing seeds with the default wheel offsets.
    pub fn complete(&self, defaults: &HarmonyDefaults) -> CompleteSeeds {
        CompleteSeeds {
            primary: self.primary,
            secondary: self
                .secondary
                .unwrap_or_else(|| rotate_hue(self.primary, defaults.secondary_offset)),
            tertiary: self
                .tertiary
                .unwrap_or_else(|| rotate_hue(self.primary, defaults.tertiary_offset)),
        }
    }

    /// Fill missing seeds from `relation`: its first color becomes the
    /// secondary, its second the tertiary. Single-color relations fall back
    /// to the default offset for the tertiary.
    pub fn complete_with(&self, relation: Harmony, defaults: &HarmonyDefaults) -> CompleteSeeds {
        if let (Some(secondary), Some(tertiary)) = (self.secondary, self.tertiary) {
            return CompleteSeeds {
                primary: self.primary,
                secondary,
                tertiary,
            };
        }
        let derived = harmonize(self.primary, relation);
        let partial = SeedSet {
            primary: self.primary,
            secondary: self.secondary.or_else(|| derived.first().copied()),
            tertiary: self.tertiary.or_else(|| derived.get(1).copied()),
        };
        partial.complete(defaults)
    }
}

impl From<CompleteSeeds> for SeedSet {
    fn from(seeds: CompleteSeeds) -> Self {
        Self::new(seeds.primary)
            .with_secondary(seeds.secondary)
            .with_tertiary(seeds.tertiary)
    }
}

// ------------------------------------------------------------
// Palettes
// ------------------------------------------------------------

/// One full set of role colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePalette {
    colors: [Color; Role::COUNT],
}

impl RolePalette {
    pub fn get(&self, role: Role) -> Color {
        self.colors[role as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, Color)> + '_ {
        Role::ALL.iter().map(|&role| (role, self.get(role)))
    }

    fn set(&mut self, role: Role, color: Color) {
        self.colors[role as usize] = color;
    }
}

impl Index<Role> for RolePalette {
    type Output = Color;

    fn index(&self, role: Role) -> &Color {
        &self.colors[role as usize]
    }
}

impl Serialize for RolePalette {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(Role::COUNT))?;
        for (role, color) in self.iter() {
            map.serialize_entry(role.name(), &color)?;
        }
        map.end()
    }
}

/// A pair that stayed below its minimum after repair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastWarning {
    pub variant: Variant,
    pub role: Role,
    pub against: Role,
    pub target: f64,
    pub achieved: f64,
}

impl ContrastWarning {
    pub fn to_error(&self) -> SchemeError {
        SchemeError::UnreachableContrastTarget {
            variant: self.variant.name().to_string(),
            role: self.role.name().to_string(),
            target: self.target,
            achieved: self.achieved,
        }
    }
}

/// Measured contrast of one declared pair in one variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairReport {
    pub variant: Variant,
    pub foreground: Role,
    pub background: Role,
    pub kind: PairKind,
    pub minimum: f64,
    pub ratio: f64,
    pub apca: f64,
    pub passes: bool,
}

/// The six palettes produced by one synthesis call.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemeBundle {
    seeds: CompleteSeeds,
    palettes: [RolePalette; 6],
    warnings: Vec<ContrastWarning>,
    targets: VariantTargets,
    tolerance: f64,
}

impl SchemeBundle {
    pub fn seeds(&self) -> &CompleteSeeds {
        &self.seeds
    }

    pub fn get(&self, variant: Variant) -> &RolePalette {
        &self.palettes[variant.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variant, &RolePalette)> + '_ {
        Variant::ALL.iter().map(move |&v| (v, self.get(v)))
    }

    pub fn warnings(&self) -> &[ContrastWarning] {
        &self.warnings
    }

    /// The minimum ratio `variant` promises for pairs of `kind`.
    pub fn minimum(&self, variant: Variant, kind: PairKind) -> f64 {
        self.targets.for_variant(variant).minimum(kind)
    }

    pub fn contrast_report(&self) -> Vec<PairReport> {
        let mut report = Vec::with_capacity(Variant::ALL.len() * ROLE_PAIRS.len());
        for (variant, palette) in self.iter() {
            for pair in ROLE_PAIRS {
                let fg = palette.get(pair.foreground);
                let bg = palette.get(pair.background);
                let minimum = self.minimum(variant, pair.kind);
                let ratio = contrast_ratio(fg, bg);
                report.push(PairReport {
                    variant,
                    foreground: pair.foreground,
                    background: pair.background,
                    kind: pair.kind,
                    minimum,
                    ratio,
                    apca: apca_contrast(fg, bg),
                    passes: ratio >= minimum - self.tolerance,
                });
            }
        }
        report
    }

    /// Pairs below their variant minimum (beyond the tolerance).
    pub fn violations(&self) -> Vec<PairReport> {
        self.contrast_report().into_iter().filter(|r| !r.passes).collect()
    }

    /// Turn the first contrast warning, if any, into an error.
    pub fn ensure_contrast(&self) -> Result<()> {
        match self.warnings.first() {
            Some(warning) => Err(warning.to_error()),
            None => Ok(()),
        }
    }
}

impl Index<Variant> for SchemeBundle {
    type Output = RolePalette;

    fn index(&self, variant: Variant) -> &RolePalette {
        self.get(variant)
    }
}

struct Schemes<'a>(&'a SchemeBundle);

impl Serialize for Schemes<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(Variant::ALL.len()))?;
        for (variant, palette) in self.0.iter() {
            map.serialize_entry(variant.name(), palette)?;
        }
        map.end()
    }
}

impl Serialize for SchemeBundle {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("SchemeBundle", 3)?;
        state.serialize_field("seeds", &self.seeds)?;
        state.serialize_field("schemes", &Schemes(self))?;
        state.serialize_field("warnings", &self.warnings)?;
        state.end()
    }
}

// ------------------------------------------------------------
// Tonal recipes
// ------------------------------------------------------------

/// The color with `base`'s Oklch hue and chroma whose CIE L* equals
/// `tone` (0 black, 100 white). Chroma is reduced where sRGB runs out.
pub fn color_at_tone(base: Oklch, tone: f32) -> Color {
    if tone <= 0.0 {
        return Color::BLACK;
    }
    if tone >= 100.0 {
        return Color::WHITE;
    }
    let at = |l: f32| Color::from_oklch(Oklch::new(l, base.chroma, base.hue));
    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    for _ in 0..TONE_STEPS {
        let mid = (lo + hi) * 0.5;
        if at(mid).to_lab().l < tone {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    at((lo + hi) * 0.5)
}

#[derive(Debug, Clone, Copy)]
enum Source {
    Primary,
    Secondary,
    Tertiary,
    Error,
    Neutral,
    NeutralVariant,
}

enum Recipe {
    /// The seed itself, pulled into the key tone range when needed.
    Key(Source),
    /// A fixed tone per brightness: (light, dark).
    Tone(Source, f32, f32),
}

fn recipe(role: Role) -> Recipe {
    use Recipe::{Key, Tone};
    use Source::*;
    match role {
        Role::Primary => Key(Primary),
        Role::OnPrimary => Tone(Primary, 100.0, 20.0),
        Role::PrimaryContainer => Tone(Primary, 90.0, 30.0),
        Role::OnPrimaryContainer => Tone(Primary, 10.0, 90.0),
        Role::Secondary => Key(Secondary),
        Role::OnSecondary => Tone(Secondary, 100.0, 20.0),
        Role::SecondaryContainer => Tone(Secondary, 90.0, 30.0),
        Role::OnSecondaryContainer => Tone(Secondary, 10.0, 90.0),
        Role::Tertiary => Key(Tertiary),
        Role::OnTertiary => Tone(Tertiary, 100.0, 20.0),
        Role::TertiaryContainer => Tone(Tertiary, 90.0, 30.0),
        Role::OnTertiaryContainer => Tone(Tertiary, 10.0, 90.0),
        Role::Error => Key(Error),
        Role::OnError => Tone(Error, 100.0, 20.0),
        Role::ErrorContainer => Tone(Error, 90.0, 30.0),
        Role::OnErrorContainer => Tone(Error, 10.0, 90.0),
        Role::Background => Tone(Neutral, 98.0, 6.0),
        Role::OnBackground => Tone(Neutral, 10.0, 90.0),
        Role::Surface => Tone(Neutral, 98.0, 6.0),
        Role::OnSurface => Tone(Neutral, 10.0, 90.0),
        Role::SurfaceVariant => Tone(NeutralVariant, 90.0, 30.0),
        Role::OnSurfaceVariant => Tone(NeutralVariant, 30.0, 80.0),
        Role::Outline => Tone(NeutralVariant, 50.0, 60.0),
        Role::OutlineVariant => Tone(NeutralVariant, 80.0, 30.0),
        Role::Shadow => Tone(Neutral, 0.0, 0.0),
        Role::Scrim => Tone(Neutral, 0.0, 0.0),
        Role::InverseSurface => Tone(Neutral, 20.0, 90.0),
        Role::InverseOnSurface => Tone(Neutral, 95.0, 20.0),
        Role::InversePrimary => Tone(Primary, 80.0, 40.0),
        Role::SurfaceDim => Tone(Neutral, 87.0, 6.0),
        Role::SurfaceBright => Tone(Neutral, 98.0, 24.0),
        Role::SurfaceContainerLowest => Tone(Neutral, 100.0, 4.0),
        Role::SurfaceContainerLow => Tone(Neutral, 96.0, 10.0),
        Role::SurfaceContainer => Tone(Neutral, 94.0, 12.0),
        Role::SurfaceContainerHigh => Tone(Neutral, 92.0, 17.0),
        Role::SurfaceContainerHighest => Tone(Neutral, 90.0, 22.0),
    }
}

/// Hue and chroma of every tonal source for one synthesis call.
struct Sources {
    primary: Color,
    secondary: Color,
    tertiary: Color,
    primary_lch: Oklch,
}

impl Sources {
    fn new(seeds: &CompleteSeeds) -> Self {
        Self {
            primary: seeds.primary,
            secondary: seeds.secondary,
            tertiary: seeds.tertiary,
            primary_lch: seeds.primary.to_oklch(),
        }
    }

    fn seed(&self, source: Source) -> Option<Color> {
        match source {
            Source::Primary => Some(self.primary),
            Source::Secondary => Some(self.secondary),
            Source::Tertiary => Some(self.tertiary),
            Source::Error => Some(ERROR_SEED),
            Source::Neutral | Source::NeutralVariant => None,
        }
    }

    fn hue_chroma(&self, source: Source) -> Oklch {
        match (source, self.seed(source)) {
            (Source::Neutral, _) => Oklch::new(0.0, NEUTRAL_CHROMA, self.primary_lch.hue),
            (Source::NeutralVariant, _) => Oklch::new(0.0, NEUTRAL_VARIANT_CHROMA, self.primary_lch.hue),
            (_, Some(seed)) => seed.to_oklch(),
            (_, None) => Oklch::new(0.0, 0.0, 0.0),
        }
    }

    fn tone(&self, source: Source, tone: f32) -> Color {
        color_at_tone(self.hue_chroma(source), tone)
    }

    fn key(&self, source: Source, dark: bool) -> Color {
        let Some(seed) = self.seed(source) else {
            return self.tone(source, if dark { 80.0 } else { 40.0 });
        };
        let (lo, hi) = if dark { KEY_TONES_DARK } else { KEY_TONES_LIGHT };
        let tone = seed.to_lab().l;
        if (lo..=hi).contains(&tone) {
            seed
        } else {
            color_at_tone(seed.to_oklch(), tone.clamp(lo, hi))
        }
    }
}

fn base_palette(sources: &Sources, dark: bool) -> RolePalette {
    let mut palette = RolePalette {
        colors: [Color::BLACK; Role::COUNT],
    };
    for role in Role::ALL {
        let color = match recipe(role) {
            Recipe::Key(source) => sources.key(source, dark),
            Recipe::Tone(source, light, dark_tone) => sources.tone(source, if dark { dark_tone } else { light }),
        };
        palette.set(role, color);
    }
    palette
}

// ------------------------------------------------------------
// Contrast enforcement
// ------------------------------------------------------------

/// Push every declared pair of `palette` up to `targets`.
///
/// The foreground moves first. When even the extreme on the foreground's
/// side cannot reach the target, the background is moved away from that
/// extreme first so polarity is kept.
fn enforce(palette: &mut RolePalette, targets: ContrastTargets, adjust: &AdjustConfig) {
    for _ in 0..ENFORCE_PASSES {
        let mut changed = false;
        for pair in ROLE_PAIRS {
            let minimum = targets.minimum(pair.kind);
            let fg = palette.get(pair.foreground);
            let mut bg = palette.get(pair.background);
            if contrast_ratio(fg, bg) >= minimum {
                continue;
            }
            changed = true;

            let side = Direction::away_from(fg, bg).extreme();
            if contrast_ratio(side, bg) < minimum + BACKGROUND_HEADROOM {
                let goal = (minimum + BACKGROUND_HEADROOM).min(21.0);
                bg = adjust_to_target_contrast(bg, side, goal, ContrastRole::Background, adjust).color;
                palette.set(pair.background, bg);
            }

            let result = adjust_to_target_contrast(fg, bg, minimum, ContrastRole::Foreground, adjust);
            palette.set(pair.foreground, result.color);
        }
        if !changed {
            break;
        }
    }
}

fn unmet_pairs(
    palette: &RolePalette,
    variant: Variant,
    targets: ContrastTargets,
    tolerance: f64,
) -> Vec<ContrastWarning> {
    ROLE_PAIRS
        .iter()
        .filter_map(|pair| {
            let target = targets.minimum(pair.kind);
            let achieved = contrast_ratio(palette.get(pair.foreground), palette.get(pair.background));
            (achieved < target - tolerance).then_some(ContrastWarning {
                variant,
                role: pair.foreground,
                against: pair.background,
                target,
                achieved,
            })
        })
        .collect()
}

// ------------------------------------------------------------
// Entry points
// ------------------------------------------------------------

/// Synthesize all six variants, completing missing seeds with the default
/// harmony offsets from `config.harmony`.
pub fn synthesize(seeds: &SeedSet, config: &SchemeConfig) -> SchemeBundle {
    synthesize_complete(seeds.complete(&config.harmony), config)
}

/// Synthesize from fully specified seeds.
pub fn synthesize_complete(seeds: CompleteSeeds, config: &SchemeConfig) -> SchemeBundle {
    let sources = Sources::new(&seeds);
    let targets = &config.targets;
    let tolerance = config.adjust.tolerance;

    let mut light = base_palette(&sources, false);
    enforce(&mut light, targets.for_variant(Variant::Light), &config.adjust);
    let mut dark = base_palette(&sources, true);
    enforce(&mut dark, targets.for_variant(Variant::Dark), &config.adjust);

    let stricter = |base: &RolePalette, variant: Variant| {
        let mut palette = base.clone();
        enforce(&mut palette, targets.for_variant(variant), &config.adjust);
        palette
    };
    let palettes = [
        stricter(&light, Variant::LightMediumContrast),
        stricter(&light, Variant::LightHighContrast),
        stricter(&dark, Variant::DarkMediumContrast),
        stricter(&dark, Variant::DarkHighContrast),
    ];
    let [light_medium, light_high, dark_medium, dark_high] = palettes;
    let palettes = [light, dark, light_medium, light_high, dark_medium, dark_high];

    let mut warnings = Vec::new();
    for variant in Variant::ALL {
        let unmet = unmet_pairs(&palettes[variant.index()], variant, targets.for_variant(variant), tolerance);
        for warning in &unmet {
            log::warn!(
                "{}: {} on {} reaches {:.2}:1, target {:.2}:1",
                variant.name(),
                warning.role.name(),
                warning.against.name(),
                warning.achieved,
                warning.target
            );
        }
        warnings.extend(unmet);
    }

    log::debug!(
        "synthesized scheme from {} / {} / {}",
        seeds.primary,
        seeds.secondary,
        seeds.tertiary
    );

    SchemeBundle {
        seeds,
        palettes,
        warnings,
        targets: targets.clone(),
        tolerance,
    }
}

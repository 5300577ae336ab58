//! Image to accessible color scheme.
//!
//! Extracts seed colors from a decoded RGBA8 buffer (or takes them from the
//! caller) and expands them into six Material-style role palettes whose
//! paired roles meet WCAG contrast minimums.
//!
//! ```
//! use image_to_color_scheme_wasm::{scheme_from_seeds, Color, Role, SchemeConfig, Variant};
//!
//! let bundle = scheme_from_seeds(&[Color::from_hex("#6366F1")?], &SchemeConfig::default())?;
//! let light = bundle.get(Variant::Light);
//! println!("primary {} on {}", light[Role::OnPrimary], light[Role::Primary]);
//! assert!(bundle.violations().is_empty());
//! # Ok::<(), image_to_color_scheme_wasm::SchemeError>(())
//! ```
//!
//! The same pipeline is exported to JavaScript through `wasm-bindgen`.

use js_sys::Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod cluster;
pub mod color;
pub mod config;
pub mod contrast;
pub mod error;
pub mod harmony;
pub mod sampler;
pub mod scheme;
pub mod seeds;

pub use cluster::{Cluster, ClusterScore};
pub use color::{apca_contrast, contrast_ratio, Color};
pub use config::{
    AdjustConfig, ClusterConfig, ContrastTargets, EngineConfig, HarmonyDefaults, SamplerConfig, SchemeConfig,
    ScoreWeights, SelectionConfig, VariantTargets,
};
pub use contrast::{adjust_to_target_contrast, Adjustment, ContrastRole};
pub use error::{Result, SchemeError};
pub use harmony::{harmonize, Harmony};
pub use sampler::{filter_samples, PixelBuffer, Sample};
pub use scheme::{
    synthesize, CompleteSeeds, ContrastWarning, PairKind, PairReport, Role, RolePalette, SchemeBundle, SeedSet,
    Variant,
};
pub use seeds::select_seeds;

// ------------------------------------------------------------
// Pipeline
// ------------------------------------------------------------

/// Sample, cluster and score `buffer`. Clusters come back heaviest first.
pub fn extract_palette(buffer: &PixelBuffer<'_>, config: &EngineConfig) -> Result<Vec<Cluster>> {
    config.validate()?;
    let samples = filter_samples(buffer, &config.sampler)?;
    let clusters = cluster::cluster(&samples, &config.cluster);
    Ok(seeds::score_clusters(&clusters, &config.selection))
}

/// Pick `count` (1 to 3) seeds from `buffer`.
///
/// Fewer seeds than requested come back when the image holds fewer
/// distinct colors; the missing ones are filled in at synthesis time.
///
/// # Errors
///
/// [`SchemeError::InsufficientColorData`] when no pixel survives filtering,
/// [`SchemeError::InvalidSeedCount`] for `count` outside `1..=3`, and
/// [`SchemeError::InvalidParameter`] for an invalid `config`.
pub fn extract_seeds(buffer: &PixelBuffer<'_>, config: &EngineConfig, count: usize) -> Result<SeedSet> {
    if !(1..=3).contains(&count) {
        return Err(SchemeError::InvalidSeedCount(count));
    }
    let clusters = extract_palette(buffer, config)?;
    let colors = select_seeds(&clusters, count, &config.selection)?;
    SeedSet::from_colors(&colors)
}

/// Full pipeline: extract seeds from `buffer` and synthesize all variants.
pub fn scheme_from_pixels(buffer: &PixelBuffer<'_>, config: &EngineConfig, count: usize) -> Result<SchemeBundle> {
    let seeds = extract_seeds(buffer, config, count)?;
    Ok(synthesize(&seeds, &config.scheme))
}

/// Synthesize from explicit seeds (primary, then optional secondary and
/// tertiary).
pub fn scheme_from_seeds(seeds: &[Color], config: &SchemeConfig) -> Result<SchemeBundle> {
    let seeds = SeedSet::from_colors(seeds)?;
    config.validate()?;
    Ok(synthesize(&seeds, config))
}

// ------------------------------------------------------------
// WebAssembly bindings
// ------------------------------------------------------------

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Plain JS object built from the serde JSON of `value`.
fn to_js<T: Serialize>(value: &T) -> std::result::Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(js_error)?;
    js_sys::JSON::parse(&json)
}

fn engine_config(json: Option<String>) -> Result<EngineConfig> {
    match json {
        Some(json) => EngineConfig::from_json(&json),
        None => Ok(EngineConfig::default()),
    }
}

/// Build a scheme from the RGBA8 data of a canvas `ImageData`.
///
/// Resizing to an analysis resolution and blurring are up to the caller.
/// `config` is an optional partial `EngineConfig` as JSON.
#[wasm_bindgen(js_name = extractScheme)]
pub fn extract_scheme(
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    seed_count: usize,
    config: Option<String>,
) -> std::result::Result<JsValue, JsValue> {
    let config = engine_config(config).map_err(js_error)?;
    let buffer = PixelBuffer::new(width, height, &pixels).map_err(js_error)?;
    let bundle = scheme_from_pixels(&buffer, &config, seed_count).map_err(js_error)?;
    to_js(&bundle)
}

/// Build a scheme from one to three hex strings.
#[wasm_bindgen(js_name = schemeFromSeeds)]
pub fn scheme_from_hex_seeds(hex_colors: Array, config: Option<String>) -> std::result::Result<JsValue, JsValue> {
    let config = engine_config(config).map_err(js_error)?;
    let mut seeds = Vec::with_capacity(hex_colors.length() as usize);
    for value in hex_colors.iter() {
        let hex = value
            .as_string()
            .ok_or_else(|| JsValue::from_str("Seed colors must be strings"))?;
        seeds.push(Color::from_hex(&hex).map_err(js_error)?);
    }
    let bundle = scheme_from_seeds(&seeds, &config.scheme).map_err(js_error)?;
    to_js(&bundle)
}

/// Companion colors of `hex` for a named relation, as hex strings.
#[wasm_bindgen(js_name = harmonize)]
pub fn harmonize_hex(hex: &str, relation: &str) -> std::result::Result<Array, JsValue> {
    let seed = Color::from_hex(hex).map_err(js_error)?;
    let relation: Harmony = relation.parse().map_err(js_error)?;
    let colors = Array::new();
    for color in harmonize(seed, relation) {
        colors.push(&JsValue::from_str(&color.to_hex()));
    }
    Ok(colors)
}

/// WCAG contrast ratio between two hex colors, in `[1, 21]`.
#[wasm_bindgen(js_name = contrastRatio)]
pub fn contrast_ratio_hex(a: &str, b: &str) -> std::result::Result<f64, JsValue> {
    let a = Color::from_hex(a).map_err(js_error)?;
    let b = Color::from_hex(b).map_err(js_error)?;
    Ok(contrast_ratio(a, b))
}

/// Unsigned APCA lightness contrast of `fg` text on `bg`.
#[wasm_bindgen(js_name = apcaContrast)]
pub fn apca_contrast_hex(fg: &str, bg: &str) -> std::result::Result<f64, JsValue> {
    let fg = Color::from_hex(fg).map_err(js_error)?;
    let bg = Color::from_hex(bg).map_err(js_error)?;
    Ok(apca_contrast(fg, bg))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn striped(width: u32, height: u32, colors: &[[u8; 4]]) -> Vec<u8> {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for _ in 0..width {
                data.extend_from_slice(&colors[(y as usize) % colors.len()]);
            }
        }
        data
    }

    #[test]
    fn seed_count_fails_fast() {
        let data = striped(4, 4, &[[200, 40, 40, 255]]);
        let buffer = PixelBuffer::new(4, 4, &data).unwrap();
        let config = EngineConfig::default();
        assert!(matches!(extract_seeds(&buffer, &config, 0), Err(SchemeError::InvalidSeedCount(0))));
        assert!(matches!(scheme_from_seeds(&[], &SchemeConfig::default()), Err(SchemeError::InvalidSeedCount(0))));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let data = striped(4, 4, &[[200, 40, 40, 255]]);
        let buffer = PixelBuffer::new(4, 4, &data).unwrap();
        let mut config = EngineConfig::default();
        config.sampler.stride = 0;
        assert!(matches!(
            extract_palette(&buffer, &config),
            Err(SchemeError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn single_color_image_yields_that_seed() {
        let data = striped(20, 20, &[[200, 40, 40, 255]]);
        let buffer = PixelBuffer::new(20, 20, &data).unwrap();
        let seeds = extract_seeds(&buffer, &EngineConfig::default(), 3).unwrap();
        assert_eq!(seeds.primary(), Color::new(200, 40, 40));
        assert_eq!(seeds.secondary(), None);
    }
}

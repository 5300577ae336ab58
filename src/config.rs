//! Tunable parameters for every stage of the engine.
//!
//! Each stage takes its own struct explicitly; nothing is read from global
//! state. All structs deserialize from partial JSON (missing fields take the
//! defaults below), so a caller can override a single knob:
//!
//! ```
//! use image_to_color_scheme_wasm::EngineConfig;
//!
//! let config = EngineConfig::from_json(r#"{ "cluster": { "k": 6 } }"#)?;
//! assert_eq!(config.cluster.k, 6);
//! assert_eq!(config.sampler.stride, 5);
//! # Ok::<(), image_to_color_scheme_wasm::SchemeError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemeError};

/// Pixel filtering applied before clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SamplerConfig {
    /// Visit every Nth pixel of the buffer.
    pub stride: usize,
    /// Pixels with alpha below this are treated as transparent.
    pub alpha_threshold: u8,
    /// HSL saturation below this counts as gray.
    pub min_saturation: f32,
    /// HSL lightness bounds; pixels outside are too dark or too bright.
    pub min_lightness: f32,
    pub max_lightness: f32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            stride: 5,
            alpha_threshold: 128,
            min_saturation: 0.2,
            min_lightness: 0.1,
            max_lightness: 0.9,
        }
    }
}

/// k-means parameters. Clustering runs in CIE Lab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterConfig {
    pub k: usize,
    pub max_iterations: usize,
    /// Centroid movement (Lab units) under which a run counts as converged.
    pub convergence: f32,
    /// Independent seeded runs; the tightest result wins.
    pub runs: u64,
    pub seed: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            k: 8,
            max_iterations: 20,
            convergence: 1e-4,
            runs: 3,
            seed: 0,
        }
    }
}

/// Relative weights of the four cluster scores. Normalized before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub vibrancy: f32,
    pub uniqueness: f32,
    pub frequency: f32,
    pub balance: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            vibrancy: 0.25,
            uniqueness: 0.25,
            frequency: 0.25,
            balance: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectionConfig {
    pub weights: ScoreWeights,
    /// ΔE2000 below which a candidate is penalized as a near-duplicate of an
    /// already chosen seed.
    pub min_seed_distance: f32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            min_seed_distance: 20.0,
        }
    }
}

/// Knobs for [`adjust_to_target_contrast`](crate::contrast::adjust_to_target_contrast).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdjustConfig {
    /// Exponent applied to the luminance ratio on each lightness step.
    pub damping_exponent: f64,
    /// Maximum relative chroma boost for foreground colors.
    pub chroma_boost_cap: f32,
    pub max_steps: usize,
    /// Slack allowed when checking a ratio against its target.
    pub tolerance: f64,
}

impl Default for AdjustConfig {
    fn default() -> Self {
        Self {
            damping_exponent: 0.4,
            chroma_boost_cap: 0.10,
            max_steps: 24,
            tolerance: 0.05,
        }
    }
}

/// Minimum WCAG ratios for one contrast level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContrastTargets {
    /// Text roles (`on*` over their container).
    pub text: f64,
    /// Large-scale elements such as outlines.
    pub large: f64,
}

impl Default for ContrastTargets {
    fn default() -> Self {
        Self { text: 4.5, large: 3.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantTargets {
    pub standard: ContrastTargets,
    pub medium: ContrastTargets,
    pub high: ContrastTargets,
}

impl Default for VariantTargets {
    fn default() -> Self {
        Self {
            standard: ContrastTargets { text: 4.5, large: 3.0 },
            medium: ContrastTargets { text: 4.5, large: 4.5 },
            high: ContrastTargets { text: 7.0, large: 7.0 },
        }
    }
}

/// Hue rotations used to fill in seeds the caller did not supply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HarmonyDefaults {
    pub secondary_offset: f32,
    pub tertiary_offset: f32,
}

impl Default for HarmonyDefaults {
    fn default() -> Self {
        Self {
            secondary_offset: 210.0,
            tertiary_offset: 330.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemeConfig {
    pub targets: VariantTargets,
    pub adjust: AdjustConfig,
    pub harmony: HarmonyDefaults,
}

/// Configuration for the whole image-to-scheme pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sampler: SamplerConfig,
    pub cluster: ClusterConfig,
    pub selection: SelectionConfig,
    pub scheme: SchemeConfig,
}

impl EngineConfig {
    /// Parse and validate a (possibly partial) JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let sampler = &self.sampler;
        if sampler.stride == 0 {
            return Err(SchemeError::invalid_parameter("sampler.stride", sampler.stride));
        }
        if !(0.0..=1.0).contains(&sampler.min_saturation) {
            return Err(SchemeError::invalid_parameter("sampler.minSaturation", sampler.min_saturation));
        }
        if !(0.0..=1.0).contains(&sampler.min_lightness)
            || !(0.0..=1.0).contains(&sampler.max_lightness)
            || sampler.min_lightness > sampler.max_lightness
        {
            return Err(SchemeError::invalid_parameter(
                "sampler.lightness",
                format!("{}..{}", sampler.min_lightness, sampler.max_lightness),
            ));
        }

        let cluster = &self.cluster;
        // kmeans_colors stores assignments as u8.
        if !(1..=255).contains(&cluster.k) {
            return Err(SchemeError::invalid_parameter("cluster.k", cluster.k));
        }
        if cluster.max_iterations == 0 {
            return Err(SchemeError::invalid_parameter("cluster.maxIterations", 0));
        }
        if cluster.runs == 0 {
            return Err(SchemeError::invalid_parameter("cluster.runs", 0));
        }

        self.scheme.validate()
    }
}

impl SchemeConfig {
    pub fn validate(&self) -> Result<()> {
        let targets = &self.targets;
        for (name, t) in [
            ("standard", targets.standard),
            ("medium", targets.medium),
            ("high", targets.high),
        ] {
            if !(1.0..=21.0).contains(&t.text) || !(1.0..=21.0).contains(&t.large) {
                return Err(SchemeError::invalid_parameter(
                    format!("scheme.targets.{name}"),
                    format!("text {} / large {}", t.text, t.large),
                ));
            }
        }

        let adjust = &self.adjust;
        if !(adjust.damping_exponent > 0.0 && adjust.damping_exponent <= 1.0) {
            return Err(SchemeError::invalid_parameter("scheme.adjust.dampingExponent", adjust.damping_exponent));
        }
        if !(0.0..=0.10).contains(&adjust.chroma_boost_cap) {
            return Err(SchemeError::invalid_parameter("scheme.adjust.chromaBoostCap", adjust.chroma_boost_cap));
        }
        if adjust.max_steps == 0 {
            return Err(SchemeError::invalid_parameter("scheme.adjust.maxSteps", 0));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = EngineConfig::default();
        assert_eq!(config.sampler.stride, 5);
        assert_eq!(config.sampler.alpha_threshold, 128);
        assert_eq!(config.cluster.k, 8);
        assert_eq!(config.cluster.max_iterations, 20);
        assert_eq!(config.scheme.adjust.damping_exponent, 0.4);
        assert_eq!(config.scheme.targets.high.text, 7.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = EngineConfig::from_json(r#"{ "sampler": { "stride": 2 }, "scheme": { "adjust": { "dampingExponent": 0.5 } } }"#)
            .unwrap();
        assert_eq!(config.sampler.stride, 2);
        assert_eq!(config.sampler.alpha_threshold, 128);
        assert_eq!(config.scheme.adjust.damping_exponent, 0.5);
        assert_eq!(config.scheme.adjust.max_steps, 24);
    }

    #[test]
    fn json_round_trip() {
        let config = EngineConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(EngineConfig::from_json(r#"{ "sampler": { "stride": 0 } }"#).is_err());
        assert!(EngineConfig::from_json(r#"{ "cluster": { "k": 300 } }"#).is_err());
        assert!(EngineConfig::from_json(r#"{ "scheme": { "adjust": { "chromaBoostCap": 0.5 } } }"#).is_err());
        assert!(EngineConfig::from_json("not json").is_err());
    }
}

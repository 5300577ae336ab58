use anyhow::{bail, Context, Result};
use clap::Parser;
use image::imageops::{self, FilterType};
use image::{GenericImageView, RgbaImage};
use image_to_color_scheme_wasm::scheme::synthesize_complete;
use image_to_color_scheme_wasm::{
    extract_seeds, Color, EngineConfig, Harmony, PixelBuffer, SchemeBundle, SchemeError, SeedSet,
};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

/// Generate accessible light/dark color schemes from images or seed colors.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input image paths. Without any, --color seeds are used directly.
    inputs: Vec<PathBuf>,

    /// Number of k-means clusters
    #[arg(short = 'k', long)]
    clusters: Option<usize>,

    /// Visit every Nth pixel when sampling
    #[arg(long)]
    stride: Option<usize>,

    /// Seeds to extract from each image (1 to 3)
    #[arg(long, default_value_t = 3)]
    seeds: usize,

    /// Explicit seed color; repeat for secondary and tertiary. Used when an
    /// image has no usable color.
    #[arg(short = 'c', long = "color")]
    colors: Vec<String>,

    /// Complete missing seeds with this relation instead of the default offsets
    #[arg(long)]
    harmony: Option<Harmony>,

    /// JSON file with engine configuration overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Longest side of the analysis image
    #[arg(long, default_value_t = 150)]
    analysis_size: u32,

    /// Gaussian blur sigma applied before sampling (0 disables)
    #[arg(long, default_value_t = 1.0)]
    blur: f32,

    /// Write one <stem>.json per input here instead of printing
    #[arg(short = 'd', long)]
    out_dir: Option<PathBuf>,

    /// Fail when any contrast target could not be met
    #[arg(long)]
    strict: bool,

    /// Include per-pair WCAG and APCA measurements
    #[arg(long)]
    report: bool,
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            EngineConfig::from_json(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(k) = args.clusters {
        config.cluster.k = k;
    }
    if let Some(stride) = args.stride {
        config.sampler.stride = stride;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Shrink to the analysis size and soften noise before sampling.
fn prepare(path: &Path, size: u32, sigma: f32) -> Result<RgbaImage> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let img = image::load_from_memory(&bytes).with_context(|| format!("decoding {}", path.display()))?;
    let (w, h) = img.dimensions();
    let max_side = w.max(h);
    let rgba = if size > 0 && max_side > size {
        let ratio = size as f32 / max_side as f32;
        let down_w = ((w as f32) * ratio).round().max(1.0) as u32;
        let down_h = ((h as f32) * ratio).round().max(1.0) as u32;
        imageops::resize(&img, down_w, down_h, FilterType::Triangle)
    } else {
        img.to_rgba8()
    };
    Ok(if sigma > 0.0 { imageops::blur(&rgba, sigma) } else { rgba })
}

fn build(seeds: SeedSet, config: &EngineConfig, harmony: Option<Harmony>) -> SchemeBundle {
    let defaults = &config.scheme.harmony;
    let complete = match harmony {
        Some(relation) => seeds.complete_with(relation, defaults),
        None => seeds.complete(defaults),
    };
    synthesize_complete(complete, &config.scheme)
}

fn render(bundle: &SchemeBundle, args: &Args) -> Result<String> {
    let value = if args.report {
        json!({ "scheme": bundle, "report": bundle.contrast_report() })
    } else {
        serde_json::to_value(bundle)?
    };
    Ok(serde_json::to_string_pretty(&value)?)
}

fn emit(bundle: &SchemeBundle, args: &Args, stem: &str) -> Result<()> {
    if args.strict {
        bundle.ensure_contrast().context("contrast check failed")?;
    }
    for warning in bundle.warnings() {
        log::warn!("{stem}: {}", warning.to_error());
    }
    let text = render(bundle, args)?;
    match &args.out_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let out_path = dir.join(format!("{stem}.json"));
            fs::write(&out_path, text)?;
            println!("Saved → {}", out_path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(&args)?;

    let manual: Vec<Color> = args
        .colors
        .iter()
        .map(|hex| Color::from_hex(hex).with_context(|| format!("bad --color {hex}")))
        .collect::<Result<_>>()?;
    let fallback = if manual.is_empty() {
        None
    } else {
        Some(SeedSet::from_colors(&manual).context("--color may be given one to three times")?)
    };

    if args.inputs.is_empty() {
        let Some(seeds) = fallback else {
            bail!("give at least one image or --color");
        };
        return emit(&build(seeds, &config, args.harmony), &args, "scheme");
    }

    for input in &args.inputs {
        let rgba = prepare(input, args.analysis_size, args.blur)?;
        let buffer = PixelBuffer::from_rgba_image(&rgba);
        let seeds = match extract_seeds(&buffer, &config, args.seeds) {
            Ok(seeds) => seeds,
            Err(err @ SchemeError::InsufficientColorData { .. }) => match fallback {
                Some(seeds) => {
                    log::info!("{}: {err}; using --color seeds", input.display());
                    seeds
                }
                None => return Err(err).with_context(|| format!("{} (pass --color to fall back)", input.display())),
            },
            Err(err) => return Err(err).with_context(|| format!("processing {}", input.display())),
        };
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        emit(&build(seeds, &config, args.harmony), &args, &stem)?;
    }

    Ok(())
}

//! Reduce a decoded RGBA8 buffer to weighted color samples worth clustering.
//!
//! Decoding, resizing to the analysis resolution and blurring happen on the
//! caller's side; this module only filters and aggregates.

use std::collections::HashMap;

use image::RgbaImage;

use crate::color::Color;
use crate::config::SamplerConfig;
use crate::error::{Result, SchemeError};

/// Borrowed view over tightly packed RGBA8 pixels.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl<'a> PixelBuffer<'a> {
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .unwrap_or(usize::MAX);
        if data.len() != expected {
            return Err(SchemeError::InvalidBuffer {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    /// View an already decoded `image` buffer.
    pub fn from_rgba_image(image: &'a RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: image.as_raw(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len() / 4
    }

    fn pixel(&self, index: usize) -> [u8; 4] {
        let i = index * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}

/// A distinct color and the number of visited pixels that had it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub color: Color,
    pub weight: u32,
}

/// Whether a single RGBA pixel survives the alpha, gray and lightness filters.
pub fn keep_pixel(rgba: [u8; 4], config: &SamplerConfig) -> Option<Color> {
    if rgba[3] < config.alpha_threshold {
        return None;
    }
    let color = Color::new(rgba[0], rgba[1], rgba[2]);
    let hsl = color.to_hsl();
    if hsl.saturation < config.min_saturation {
        return None;
    }
    if hsl.lightness < config.min_lightness || hsl.lightness > config.max_lightness {
        return None;
    }
    Some(color)
}

/// Visit every `config.stride`-th pixel and aggregate the survivors.
///
/// Samples come out in first-seen order, which keeps clustering input (and
/// therefore its output) deterministic for a given buffer.
///
/// # Errors
///
/// [`SchemeError::InsufficientColorData`] when no pixel passes the filters;
/// callers are expected to fall back to manual seed colors.
pub fn filter_samples(buffer: &PixelBuffer<'_>, config: &SamplerConfig) -> Result<Vec<Sample>> {
    let stride = config.stride.max(1);
    let mut samples: Vec<Sample> = Vec::new();
    let mut index_of: HashMap<Color, usize> = HashMap::new();
    let mut visited = 0usize;

    for i in (0..buffer.pixel_count()).step_by(stride) {
        visited += 1;
        let Some(color) = keep_pixel(buffer.pixel(i), config) else {
            continue;
        };
        match index_of.get(&color) {
            Some(&idx) => samples[idx].weight += 1,
            None => {
                index_of.insert(color, samples.len());
                samples.push(Sample { color, weight: 1 });
            }
        }
    }

    if samples.is_empty() {
        return Err(SchemeError::InsufficientColorData { visited });
    }

    log::debug!(
        "sampled {} distinct colors from {} of {} pixels",
        samples.len(),
        visited,
        buffer.pixel_count()
    );
    Ok(samples)
}

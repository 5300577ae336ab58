use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{Rgba, RgbaImage};
use image_to_color_scheme_wasm::cluster::cluster;
use image_to_color_scheme_wasm::{
    filter_samples, scheme_from_pixels, synthesize, Color, EngineConfig, PixelBuffer, SchemeConfig, SeedSet,
};

/// A 150×150 image at the analysis resolution the CLI produces.
fn analysis_image() -> RgbaImage {
    RgbaImage::from_fn(150, 150, |x, y| {
        let r = (x * 255 / 149) as u8;
        let g = (y * 255 / 149) as u8;
        let b = ((x + y) * 255 / 298) as u8;
        Rgba([r, g, 255 - b, 255])
    })
}

fn benchmark_extraction(c: &mut Criterion) {
    let image = analysis_image();
    let buffer = PixelBuffer::from_rgba_image(&image);
    let config = EngineConfig::default();

    c.bench_function("sample_and_cluster_150x150", |b| {
        b.iter(|| {
            let samples = filter_samples(black_box(&buffer), &config.sampler).unwrap_or_default();
            black_box(cluster(&samples, &config.cluster))
        })
    });

    c.bench_function("scheme_from_pixels_150x150", |b| {
        b.iter(|| black_box(scheme_from_pixels(black_box(&buffer), &config, 3).ok()))
    });
}

fn benchmark_synthesis(c: &mut Criterion) {
    let seeds = SeedSet::new(Color::new(0x63, 0x66, 0xF1));
    let config = SchemeConfig::default();

    c.bench_function("synthesize_six_variants", |b| {
        b.iter(|| black_box(synthesize(black_box(&seeds), &config)))
    });
}

criterion_group!(benches, benchmark_extraction, benchmark_synthesis);
criterion_main!(benches);

//! Benchmarks for the Chapterlift page pipeline.
//!
//! Run with: cargo bench -p chapterlift-core

use chapterlift_core::pipeline::{naming, Hasher, ImageTransformer};
use chapterlift_core::TransformConfig;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

/// A synthetic page with some gradient so the encoder has real work.
fn page_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("encode fixture");
    buffer.into_inner()
}

fn benchmark_content_hash(c: &mut Criterion) {
    let bytes = page_png(1200, 1800);

    c.bench_function("content_hash_blake3", |b| {
        b.iter(|| Hasher::content_hash_from_bytes(black_box(&bytes)))
    });
}

fn benchmark_transform_shrink(c: &mut Criterion) {
    let bytes = page_png(2400, 3400);
    let transformer = ImageTransformer::new();
    let config = TransformConfig::default();

    c.bench_function("transform_2400px_to_1600px", |b| {
        b.iter(|| {
            let _ = transformer.transform(black_box(&bytes), "page.png", &config);
        })
    });
}

fn benchmark_transform_reencode(c: &mut Criterion) {
    let bytes = page_png(1000, 1400);
    let transformer = ImageTransformer::new();
    let config = TransformConfig::default();

    c.bench_function("transform_reencode_only", |b| {
        b.iter(|| {
            let _ = transformer.transform(black_box(&bytes), "page.png", &config);
        })
    });
}

fn benchmark_output_name(c: &mut Criterion) {
    c.bench_function("output_name", |b| {
        b.iter(|| naming::output_name(black_box("Chapter 12 - page 007.png")))
    });
}

criterion_group!(
    benches,
    benchmark_content_hash,
    benchmark_transform_shrink,
    benchmark_transform_reencode,
    benchmark_output_name,
);
criterion_main!(benches);

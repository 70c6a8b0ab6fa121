//! Cell-encode benchmarks: the per-frame hot path.
//! Run: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crt::encode::CellEncoder;
use image::{Rgb, RgbImage};

fn gradient_frame(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

fn bench_encode(c: &mut Criterion) {
    let frame = gradient_frame(320, 180);

    let mut group = c.benchmark_group("encode_frame");
    group.sample_size(50);

    group.bench_function("gradient_320x180", |b| {
        let mut encoder = CellEncoder::new();
        b.iter(|| {
            let encoded = encoder.encode(black_box(&frame));
            black_box(encoded.text.len())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_encode);
criterion_main!(benches);

use criterion::{criterion_group, criterion_main, Criterion};

use dconn::color_scalars;
use dconn_core::palette::{Palette, PaletteSettings, ScalarColor};
use dconn_core::stats::FastStatistics;

fn ramp() -> Palette {
    Palette::new(
        "bench",
        vec![
            ScalarColor {
                scalar: 1.0,
                color: [1.0, 1.0, 0.0, 1.0],
            },
            ScalarColor {
                scalar: 0.0,
                color: [0.0, 0.0, 0.0, 1.0],
            },
            ScalarColor {
                scalar: -1.0,
                color: [0.0, 1.0, 1.0, 1.0],
            },
        ],
    )
}

fn bench_coloring(c: &mut Criterion) {
    let values: Vec<f32> = (0..200_000)
        .map(|i| ((i % 1000) as f32 - 500.0) / 100.0)
        .collect();
    let mut stats = FastStatistics::new();
    stats.update(&values);
    let settings = PaletteSettings::default();
    let palette = ramp();
    let mut rgba = vec![0u8; values.len() * 4];

    c.bench_function("color_200k_scalars", |b| {
        b.iter(|| color_scalars(&stats, &settings, &palette, &values, &mut rgba))
    });
}

criterion_group!(benches, bench_coloring);
criterion_main!(benches);

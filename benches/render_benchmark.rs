//! Benchmarks for medsum rendering performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks use synthetic summaries and the builtin font so results
//! do not depend on which font files the machine has.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use medsum::{FontResolution, RenderJob, SummaryRenderer};

/// Creates a synthetic summary with the given number of sections.
fn create_test_summary(sections: usize) -> String {
    let mut text = String::new();
    for i in 0..sections {
        text.push_str(&format!("■ 項目{}\n", i + 1));
        text.push_str("- **38.5度**の発熱が昨日の夕方から続いている\n");
        text.push_str("- 咳と喉の痛み\n");
        text.push_str("解熱剤を服用したが改善しなかった。夜間も眠れない状態が続いている。\n");
    }
    text
}

fn renderer() -> SummaryRenderer {
    SummaryRenderer::with_fonts(Arc::new(FontResolution::builtin()))
}

/// Benchmark classification and layout only.
fn bench_layout(c: &mut Criterion) {
    let text = create_test_summary(10);
    let renderer = renderer();

    c.bench_function("layout_10_sections", |b| {
        b.iter(|| renderer.layout(black_box(&text), "A4"));
    });
}

/// Benchmark full rendering at various sizes.
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let renderer = renderer();

    for sections in [1, 10, 50].iter() {
        let text = create_test_summary(*sections);

        group.bench_function(format!("{}_sections", sections), |b| {
            b.iter(|| renderer.render(black_box(&text), "A4").unwrap());
        });
    }

    group.finish();
}

/// Benchmark parallel batch rendering.
fn bench_batch(c: &mut Criterion) {
    let renderer = renderer();
    let jobs: Vec<RenderJob> = (0..16)
        .map(|i| RenderJob::new(create_test_summary(5), ["A4", "B5", "Receipt"][i % 3]))
        .collect();

    c.bench_function("batch_16_documents", |b| {
        b.iter(|| renderer.render_batch(black_box(&jobs)));
    });
}

criterion_group!(benches, bench_layout, bench_render, bench_batch);
criterion_main!(benches);

//! Benchmarks for card rendering.

use clozewright::highlight::SyntectHighlighter;
use clozewright::render::{ClozeView, render_for_output, render_for_preview};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn bench_render_plain(c: &mut Criterion) {
    let text = include_str!("../tests/fixtures/card.txt");
    c.bench_function("render_output_plain", |b| {
        b.iter(|| render_for_output(black_box(text), None))
    });
}

fn bench_render_highlighted(c: &mut Criterion) {
    let text = include_str!("../tests/fixtures/card.txt");
    let highlighter = SyntectHighlighter::load_defaults();

    c.bench_function("render_output_highlighted", |b| {
        b.iter(|| render_for_output(black_box(text), Some(&highlighter)))
    });
    c.bench_function("render_preview_hidden", |b| {
        b.iter(|| {
            render_for_preview(
                black_box(text),
                Some(&highlighter),
                ClozeView::Hidden { active: 2 },
            )
        })
    });
}

criterion_group!(benches, bench_render_plain, bench_render_highlighted);
criterion_main!(benches);

//! Benchmarks for card parsing.

use clozewright::cloze::parse_clozes;
use clozewright::document::parse_content;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn bench_parse_clozes_simple(c: &mut Criterion) {
    let text = "Hello {{c1::world}}! {{c2::Paris::capital}}";
    c.bench_function("parse_clozes_simple", |b| {
        b.iter(|| parse_clozes(black_box(text)))
    });
}

fn bench_parse_card(c: &mut Criterion) {
    let text = include_str!("../tests/fixtures/card.txt");
    c.bench_function("parse_content_card", |b| {
        b.iter(|| parse_content(black_box(text)))
    });
    c.bench_function("parse_clozes_card", |b| {
        b.iter(|| parse_clozes(black_box(text)))
    });
}

criterion_group!(benches, bench_parse_clozes_simple, bench_parse_card);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use condflow::text::TextMatcher;
use condflow::{all_of, any_of, document, leaf, read_condition, Condition, StatementRegistry};

/// An `allOf` of `n` partial matchers that all hold for the bench input, so
/// every leaf is tested.
fn build_wide(n: usize) -> Condition<TextMatcher> {
    all_of((0..n).map(|i| {
        leaf(
            TextMatcher::builder(condflow::text::MatchMethod::Wildcard)
                .pattern(format!("*{}*", i % 10))
                .compile()
                .unwrap(),
        )
    }))
}

/// Alternating `anyOf` / `allOf` nested `depth` levels, with a failing leaf
/// before each nested level.
fn build_deep(depth: usize) -> Condition<TextMatcher> {
    let mut tree = leaf(TextMatcher::basic("0123456789").unwrap());
    for level in 0..depth {
        tree = if level % 2 == 0 {
            any_of([leaf(TextMatcher::basic("miss").unwrap()), tree])
        } else {
            all_of([tree, leaf(TextMatcher::any())])
        };
    }
    tree
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_eval");
    let input = "0123456789";

    for &n in &[5, 20, 50] {
        let tree = build_wide(n);
        group.bench_function(&format!("{n}_leaves_wide"), |b| {
            b.iter(|| tree.evaluate(black_box(input)));
        });

        let tree = build_deep(n);
        group.bench_function(&format!("{n}_levels_deep"), |b| {
            b.iter(|| tree.evaluate(black_box(input)));
        });
    }

    group.finish();
}

fn bench_detailed(c: &mut Criterion) {
    let mut group = c.benchmark_group("detailed_eval");

    for &n in &[5, 20, 50] {
        let tree = build_wide(n);
        group.bench_function(&format!("{n}_leaves_wide"), |b| {
            b.iter(|| tree.evaluate_detailed(black_box("0123456789")));
        });
    }

    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");
    let registry = StatementRegistry::<TextMatcher>::new();

    for &n in &[5, 20, 50] {
        let text = build_wide(n).to_text().unwrap();
        group.bench_function(&format!("{n}_leaves_text"), |b| {
            b.iter(|| Condition::from_text(black_box(&text), &registry).unwrap());
        });

        let tokens = build_deep(n).to_tokens().unwrap();
        group.bench_function(&format!("{n}_levels_tokens"), |b| {
            b.iter(|| {
                let mut stream = tokens.clone();
                read_condition(&mut stream, &registry).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");

    for &n in &[5, 20, 50] {
        let tree = build_wide(n);
        group.bench_function(&format!("{n}_leaves_text"), |b| {
            b.iter(|| black_box(tree.to_text().unwrap()));
        });
        group.bench_function(&format!("{n}_leaves_parse_only"), |b| {
            let text = tree.to_text().unwrap();
            b.iter(|| document::parse(black_box(&text)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_detailed, bench_read, bench_write);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kismet::{evaluate, tokenize, DiceTerm, Expression, Modifier, SeededSource};

pub fn benchmark_parsing(c: &mut Criterion) {
    c.bench_function("tokenize spelled out modifiers", |b| {
        b.iter(|| tokenize(black_box("4d6 drop lowest 1 + 2d20 advantage - 3d6 reroll <2")))
    });
    c.bench_function("parse cursed dice", |b| {
        b.iter(|| Expression::parse(black_box("999d444")))
    });
    c.bench_function("parse multiple expressions", |b| {
        b.iter(|| Expression::parse(black_box("10d6 * (3d4! + 3) / 100d%kh2 + 100")))
    });
}

pub fn benchmark_rolling(c: &mut Criterion) {
    c.bench_function("roll cursed dice", |b| {
        let expression = Expression::Dice(DiceTerm::new(999, 444, Vec::new()));
        b.iter(|| {
            let mut source = SeededSource::seeded(1);
            evaluate(&expression, &mut source)
        });
    });
    c.bench_function("roll exploding keep highest", |b| {
        let expression = Expression::Dice(DiceTerm::new(
            100,
            6,
            vec![Modifier::Explode(None), Modifier::KeepHighest(10)],
        ));
        b.iter(|| {
            let mut source = SeededSource::seeded(1);
            evaluate(&expression, &mut source)
        });
    });
}

criterion_group!(benches, benchmark_parsing, benchmark_rolling);
criterion_main!(benches);

//! Criterion benchmarks for natural extension and extreme-point generation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use improb_core::lowprev::{LowPoly, LowPrev, LowProb};
use improb_core::{Gamble, Number, NumberKind, PossibilitySpace};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Random lower probability on every event of an `n`-outcome space.
fn random_model(n: usize, kind: NumberKind) -> (Arc<PossibilitySpace>, LowPoly) {
    let space = PossibilitySpace::range(n).unwrap();
    let mut rng = StdRng::seed_from_u64(n as u64);
    let lpr = LowProb::make_random(&space, Some(20), true, kind, &mut rng).unwrap();
    (space, lpr.as_lowpoly().clone())
}

fn ramp(space: &Arc<PossibilitySpace>, kind: NumberKind) -> Gamble {
    let values: Vec<i64> = (0..space.len() as i64).map(|i| (i * 7) % 5 - 2).collect();
    Gamble::from_i64s(space, kind, &values).unwrap()
}

fn bench_unconditional(c: &mut Criterion) {
    let mut group = c.benchmark_group("natural_extension");
    for kind in [NumberKind::Fraction, NumberKind::Float] {
        for n in [3usize, 4, 5] {
            let (space, lpr) = random_model(n, kind);
            let gamble = ramp(&space, kind);
            group.bench_with_input(BenchmarkId::new(kind.to_string(), n), &n, |b, _| {
                b.iter(|| {
                    let mut lpr = lpr.clone();
                    black_box(lpr.get_lower(black_box(&gamble), None).unwrap())
                })
            });
        }
    }
    group.finish();
}

fn bench_conditional(c: &mut Criterion) {
    let mut group = c.benchmark_group("conditional_bisection");
    group.sample_size(20);
    for kind in [NumberKind::Fraction, NumberKind::Float] {
        let (space, lpr) = random_model(4, kind);
        let gamble = ramp(&space, kind);
        let event = space.make_event(["0", "1", "2"]).unwrap();
        group.bench_function(kind.to_string(), |b| {
            b.iter(|| {
                let mut lpr = lpr.clone();
                // a random model may give the event zero lower probability
                black_box(lpr.get_lower(&gamble, Some(&event)).ok())
            })
        });
    }
    group.finish();
}

fn bench_extreme(c: &mut Criterion) {
    let mut group = c.benchmark_group("extreme_n_monotone");
    group.sample_size(10);
    let space = PossibilitySpace::range(3).unwrap();
    for k in [2usize, 3] {
        group.bench_with_input(BenchmarkId::new("size3", k), &k, |b, &k| {
            b.iter(|| {
                let count = LowProb::make_extreme_n_monotone(&space, k, None)
                    .unwrap()
                    .filter(|r| r.is_ok())
                    .count();
                black_box(count)
            })
        });
    }
    group.finish();
}

fn bench_number(c: &mut Criterion) {
    let third = Number::parse(NumberKind::Fraction, "1/3").unwrap();
    let seventh = Number::parse(NumberKind::Fraction, "2/7").unwrap();
    c.bench_function("fraction_add", |b| b.iter(|| black_box(third.try_add(&seventh).unwrap())));
}

criterion_group!(
    benches,
    bench_unconditional,
    bench_conditional,
    bench_extreme,
    bench_number
);
criterion_main!(benches);

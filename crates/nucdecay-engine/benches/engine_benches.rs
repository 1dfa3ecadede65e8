//! Criterion benchmarks for nucdecay-engine critical operations.
//!
//! Covers: matrix construction and decay evaluation in both precisions.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use nucdecay_core::{DecaySolver, Nuclide, NuclideId, Progeny};
use nucdecay_engine::{DecayDataset, DecayMatrixBuilder, NuclideIndex};

/// Linear chain of `len` nuclides with random half-lives ending in a stable one.
fn synthetic_chain(len: usize, seed: u64) -> Vec<Nuclide> {
    let mut rng = StdRng::seed_from_u64(seed);
    let ids: Vec<NuclideId> = (0..len)
        .map(|i| NuclideId::new(80, 240 - i as u32, 0).unwrap())
        .collect();
    ids.iter()
        .enumerate()
        .map(|(i, &id)| {
            if i + 1 == len {
                return Nuclide::from_half_life(id, None, 200.0, vec![]);
            }
            let half_life = 10f64.powf(rng.gen_range(0.0..12.0));
            let progeny = vec![Progeny {
                id: ids[i + 1],
                branching_fraction: 1.0,
                mode: "α".to_string(),
            }];
            Nuclide::from_half_life(id, Some(half_life), 200.0, progeny)
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let nuclides = synthetic_chain(20, 7);
    let index = NuclideIndex::build(&nuclides).unwrap();
    let builder = DecayMatrixBuilder::new(&nuclides, &index).unwrap();

    c.bench_function("build_fixed_20", |b| {
        b.iter(|| black_box(builder.build::<f64>().unwrap()))
    });
    c.bench_function("build_exact_20", |b| {
        b.iter(|| black_box(builder.build::<nucdecay_core::BigRational>().unwrap()))
    });
}

fn bench_decay(c: &mut Criterion) {
    let dataset = DecayDataset::from_nuclides("bench", 365.2422, synthetic_chain(20, 11)).unwrap();
    let mut initial = vec![0.0; dataset.len()];
    initial[0] = 1e20;
    let fixed = dataset.fixed_engine();
    let exact = dataset.exact_engine(320);

    c.bench_function("decay_fixed_20", |b| {
        b.iter(|| fixed.decay(black_box(&initial), black_box(3.15e7)).unwrap())
    });
    c.bench_function("decay_exact_20_320_digits", |b| {
        b.iter(|| exact.decay(black_box(&initial), black_box(3.15e7)).unwrap())
    });

    let times: Vec<f64> = (0..100).map(|k| k as f64 * 3.15e6).collect();
    c.bench_function("decay_series_fixed_100", |b| {
        b.iter(|| fixed.decay_series(black_box(&initial), black_box(&times)).unwrap())
    });
}

criterion_group!(benches, bench_build, bench_decay);
criterion_main!(benches);

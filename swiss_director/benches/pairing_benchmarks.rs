use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;
use swiss_director::swiss::{PairingEngine, calculate_standings};
use swiss_director::tournament::{Match, Registration, Round, SwissConfig};
use uuid::Uuid;

const FIELD_SIZES: [u32; 3] = [32, 128, 512];

/// Helper to create a field of `n` registrations
fn registrations(n: u32) -> Vec<Registration> {
    (1..=n).map(|seq| Registration::new(Uuid::new_v4(), seq)).collect()
}

/// Helper to play `rounds` rounds with random results, returning every match
fn played_event(regs: &[Registration], config: &SwissConfig, rounds: u32) -> Vec<Match> {
    let mut engine = PairingEngine::new(config.clone());
    let mut results = StdRng::seed_from_u64(42);
    let (tid, cid) = (Uuid::new_v4(), Uuid::new_v4());
    let mut matches: Vec<Match> = Vec::new();

    for n in 1..=rounds {
        let round = Round::started(Uuid::new_v4(), tid, cid, n);
        let pairings = if n == 1 {
            engine.pair_round_one(regs, &round).unwrap()
        } else {
            engine.pair_round(regs, &matches, &round, None).unwrap()
        };
        let start = matches.len();
        matches.extend(pairings.matches);
        for m in matches[start..].iter_mut().filter(|m| !m.is_complete()) {
            if results.random_bool(0.5) {
                m.submit_result(2, 1, 0).unwrap();
            } else {
                m.submit_result(0, 2, 0).unwrap();
            }
        }
    }

    matches
}

/// Benchmark round-one pairing
fn bench_round_one(c: &mut Criterion) {
    let mut group = c.benchmark_group("pair_round_one");
    let config = SwissConfig::default().with_seed(1);

    for size in FIELD_SIZES {
        let regs = registrations(size);
        let round = Round::started(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), 1);
        group.bench_with_input(BenchmarkId::from_parameter(size), &regs, |b, regs| {
            b.iter(|| {
                let mut engine = PairingEngine::new(config.clone());
                black_box(engine.pair_round_one(regs, &round).unwrap())
            });
        });
    }

    group.finish();
}

/// Benchmark pairing the fourth round after three played rounds
fn bench_pair_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("pair_round_4");
    group.sample_size(20);

    for size in FIELD_SIZES {
        let config = SwissConfig {
            max_rounds: 6,
            ..SwissConfig::default().with_seed(3)
        };
        let regs = registrations(size);
        let matches = played_event(&regs, &config, 3);
        let round = Round::started(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), 4);

        group.bench_with_input(BenchmarkId::from_parameter(size), &matches, |b, matches| {
            b.iter(|| {
                let mut engine = PairingEngine::new(config.clone());
                black_box(engine.pair_round(&regs, matches, &round, None).unwrap())
            });
        });
    }

    group.finish();
}

/// Benchmark standings after three played rounds
fn bench_standings(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate_standings");

    for size in FIELD_SIZES {
        let config = SwissConfig::for_players(size as usize).with_seed(5);
        let regs = registrations(size);
        let matches = played_event(&regs, &config, 3);

        group.bench_with_input(BenchmarkId::from_parameter(size), &matches, |b, matches| {
            b.iter(|| black_box(calculate_standings(&regs, matches, &config)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_round_one, bench_pair_round, bench_standings);
criterion_main!(benches);
